use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppEvent;
use crate::strategies;

/// Handles returned from building the strategies page.
pub struct StrategiesWidgets {
    pub page: gtk4::Box,
    /// Star button per strategy id.
    pub favorite_buttons: Vec<(&'static str, gtk4::Button)>,
}

/// Mark the favourite strategy's star.
pub fn set_favorite(widgets: &StrategiesWidgets, favorite: &str) {
    let favorite_id = strategies::lookup(favorite).map(|s| s.id);
    for (id, button) in &widgets.favorite_buttons {
        if favorite_id == Some(*id) {
            button.set_icon_name("starred-symbolic");
            button.set_tooltip_text(Some("Shown when you need help now"));
        } else {
            button.set_icon_name("non-starred-symbolic");
            button.set_tooltip_text(Some("Use as favorite"));
        }
    }
}

/// Build the emergency button and the list of calming strategies.
pub fn build_strategies_page(
    favorite: &str,
    sender: async_channel::Sender<AppEvent>,
) -> StrategiesWidgets {
    let page = gtk4::Box::new(gtk4::Orientation::Vertical, 0);

    let emergency_button = gtk4::Button::with_label("\u{1F198} I need help NOW");
    emergency_button.add_css_class("destructive-action");
    emergency_button.add_css_class("pill");
    emergency_button.set_margin_start(12);
    emergency_button.set_margin_end(12);
    emergency_button.set_margin_top(12);
    let sender_for_emergency = sender.clone();
    emergency_button.connect_clicked(move |_| {
        let _ = sender_for_emergency.try_send(AppEvent::EmergencyRequested);
    });
    page.append(&emergency_button);

    let listbox = gtk4::ListBox::new();
    listbox.set_selection_mode(gtk4::SelectionMode::None);
    listbox.add_css_class("boxed-list");
    listbox.set_margin_start(12);
    listbox.set_margin_end(12);
    listbox.set_margin_top(12);
    listbox.set_margin_bottom(12);

    let mut favorite_buttons = Vec::with_capacity(strategies::all().len());
    for strategy in strategies::all() {
        let row = libadwaita::ActionRow::builder()
            .title(strategy.title())
            .subtitle(strategy.description)
            .activatable(true)
            .build();

        let star = gtk4::Button::from_icon_name("non-starred-symbolic");
        star.set_valign(gtk4::Align::Center);
        star.add_css_class("flat");
        let id = strategy.id;
        let sender_for_star = sender.clone();
        star.connect_clicked(move |_| {
            let _ = sender_for_star.try_send(AppEvent::FavoriteChosen(id));
        });
        row.add_suffix(&star);

        let sender_for_row = sender.clone();
        row.connect_activated(move |_| {
            let _ = sender_for_row.try_send(AppEvent::StrategyActivated(id));
        });

        listbox.append(&row);
        favorite_buttons.push((id, star));
    }

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&listbox)
        .build();
    page.append(&scrolled);

    let widgets = StrategiesWidgets {
        page,
        favorite_buttons,
    };
    set_favorite(&widgets, favorite);
    widgets
}
