use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::Align;

use crate::app::AppEvent;
use crate::breathing::{BreathingPattern, Frame};

/// Handles returned from building the breathing page.
pub struct BreatheWidgets {
    pub page: gtk4::Box,
    pub area: gtk4::DrawingArea,
    /// Read by the draw function, written by the frame timer.
    pub frame: Rc<Cell<Frame>>,
    pub toggle_button: gtk4::Button,
    pub stop_button: gtk4::Button,
    pub pattern_label: gtk4::Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseStatus {
    Idle,
    Running,
    Paused,
}

/// Update the buttons for the exercise status.
pub fn set_exercise_status(widgets: &BreatheWidgets, status: ExerciseStatus) {
    match status {
        ExerciseStatus::Idle => {
            widgets.toggle_button.set_label("Start");
            widgets.toggle_button.add_css_class("suggested-action");
            widgets.stop_button.set_sensitive(false);
        }
        ExerciseStatus::Running => {
            widgets.toggle_button.set_label("Pause");
            widgets.toggle_button.remove_css_class("suggested-action");
            widgets.stop_button.set_sensitive(true);
        }
        ExerciseStatus::Paused => {
            widgets.toggle_button.set_label("Resume");
            widgets.toggle_button.add_css_class("suggested-action");
            widgets.stop_button.set_sensitive(true);
        }
    }
}

/// Build the breathing exercise page.
pub fn build_breathe_page(
    pattern: &BreathingPattern,
    sender: async_channel::Sender<AppEvent>,
) -> BreatheWidgets {
    let page = gtk4::Box::new(gtk4::Orientation::Vertical, 16);
    page.set_margin_top(20);
    page.set_margin_bottom(20);
    page.set_margin_start(20);
    page.set_margin_end(20);

    let title = gtk4::Label::new(Some("Breathing Exercise"));
    title.add_css_class("title-2");
    page.append(&title);

    let frame = Rc::new(Cell::new(Frame::default()));
    let area = gtk4::DrawingArea::new();
    area.set_content_width(250);
    area.set_content_height(250);
    area.set_vexpand(true);

    let frame_for_draw = frame.clone();
    area.set_draw_func(move |_area, cr, width, height| {
        draw_breathing(cr, width, height, frame_for_draw.get());
    });

    let click = gtk4::GestureClick::new();
    let sender_for_click = sender.clone();
    click.connect_released(move |_, _, _, _| {
        let _ = sender_for_click.try_send(AppEvent::BreathingToggle);
    });
    area.add_controller(click);
    page.append(&area);

    let button_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    button_box.set_halign(Align::Center);

    let toggle_button = gtk4::Button::with_label("Start");
    toggle_button.add_css_class("pill");
    let sender_for_toggle = sender.clone();
    toggle_button.connect_clicked(move |_| {
        let _ = sender_for_toggle.try_send(AppEvent::BreathingToggle);
    });
    button_box.append(&toggle_button);

    let stop_button = gtk4::Button::with_label("Stop");
    stop_button.add_css_class("destructive-action");
    stop_button.add_css_class("pill");
    stop_button.connect_clicked(move |_| {
        let _ = sender.try_send(AppEvent::BreathingStop);
    });
    button_box.append(&stop_button);
    page.append(&button_box);

    let pattern_label = gtk4::Label::new(Some(&pattern.summary()));
    pattern_label.add_css_class("dim-label");
    page.append(&pattern_label);

    let widgets = BreatheWidgets {
        page,
        area,
        frame,
        toggle_button,
        stop_button,
        pattern_label,
    };
    set_exercise_status(&widgets, ExerciseStatus::Idle);
    widgets
}

fn draw_breathing(cr: &gtk4::cairo::Context, width: i32, height: i32, frame: Frame) {
    let w = width as f64;
    let h = height as f64;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let max_r = (w.min(h) / 2.0 - 15.0).max(1.0);
    let r = frame.radius(max_r);

    // Outer glow
    cr.set_source_rgba(0.4, 0.7, 0.9, 0.1);
    cr.arc(cx, cy, r + 10.0, 0.0, 2.0 * PI);
    let _ = cr.fill();

    cr.set_source_rgba(0.4, 0.7, 0.9, 0.4);
    cr.arc(cx, cy, r, 0.0, 2.0 * PI);
    let _ = cr.fill();

    cr.set_source_rgba(0.5, 0.8, 1.0, 0.6);
    cr.arc(cx, cy, r * 0.6, 0.0, 2.0 * PI);
    let _ = cr.fill();

    let text = frame.phase.label();
    cr.set_source_rgba(1.0, 1.0, 1.0, 0.9);
    cr.set_font_size(18.0);
    if let Ok(extents) = cr.text_extents(text) {
        cr.move_to(cx - extents.width() / 2.0, cy + extents.height() / 2.0);
        let _ = cr.show_text(text);
    }
}
