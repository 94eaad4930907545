use gtk4::prelude::*;

use crate::app::AppEvent;
use crate::stress::{self, StressLevel};

/// Handles returned from building the stress self-assessment page.
pub struct FeelingWidgets {
    pub page: gtk4::Box,
    pub emoji_label: gtk4::Label,
    pub suggestion_label: gtk4::Label,
    pub emergency_button: gtk4::Button,
}

pub fn set_stress(widgets: &FeelingWidgets, level: StressLevel) {
    widgets.emoji_label.set_text(level.emoji());
    widgets.suggestion_label.set_text(level.suggestion());
    widgets.emergency_button.set_visible(level.is_overload());
}

/// Build the "How do I feel?" page.
pub fn build_feeling_page(
    level: StressLevel,
    sender: async_channel::Sender<AppEvent>,
) -> FeelingWidgets {
    let page = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    page.set_margin_top(20);
    page.set_margin_start(20);
    page.set_margin_end(20);

    let title = gtk4::Label::new(Some("How stressed are you right now?"));
    title.add_css_class("title-3");
    page.append(&title);

    let emoji_label = gtk4::Label::new(None);
    emoji_label.add_css_class("title-1");
    page.append(&emoji_label);

    let scale = gtk4::Scale::with_range(
        gtk4::Orientation::Horizontal,
        stress::MIN as f64,
        stress::MAX as f64,
        1.0,
    );
    scale.set_value(level.value() as f64);
    scale.set_draw_value(true);
    scale.set_digits(0);
    scale.set_hexpand(true);
    for (value, label) in stress::MARKS {
        scale.add_mark(value as f64, gtk4::PositionType::Bottom, Some(label));
    }
    let sender_for_scale = sender.clone();
    scale.connect_value_changed(move |scale| {
        let level = StressLevel::from_scale(scale.value());
        let _ = sender_for_scale.try_send(AppEvent::StressChanged(level.value()));
    });
    page.append(&scale);

    let suggestion_label = gtk4::Label::new(None);
    suggestion_label.set_wrap(true);
    suggestion_label.set_justify(gtk4::Justification::Center);
    suggestion_label.add_css_class("dim-label");
    suggestion_label.set_margin_top(12);
    page.append(&suggestion_label);

    let emergency_button = gtk4::Button::with_label("\u{1F198} I need help NOW");
    emergency_button.add_css_class("destructive-action");
    emergency_button.add_css_class("pill");
    emergency_button.set_halign(gtk4::Align::Center);
    emergency_button.connect_clicked(move |_| {
        let _ = sender.try_send(AppEvent::EmergencyRequested);
    });
    page.append(&emergency_button);

    let widgets = FeelingWidgets {
        page,
        emoji_label,
        suggestion_label,
        emergency_button,
    };
    set_stress(&widgets, level);
    widgets
}
