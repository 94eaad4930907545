use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppEvent;
use crate::emergency::Guidance;

/// Show the "You are safe" dialog. Choosing "Go to breathing" switches to the
/// breathing page and starts the exercise.
pub fn show_emergency_dialog(
    parent: &libadwaita::ApplicationWindow,
    guidance: &Guidance,
    sender: async_channel::Sender<AppEvent>,
) {
    let dialog = libadwaita::AlertDialog::builder()
        .heading(guidance.heading)
        .body(guidance.body.as_str())
        .build();
    dialog.add_response("breathe", "Go to breathing");
    dialog.add_response("ok", "OK");
    dialog.set_response_appearance("breathe", libadwaita::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("breathe"));
    dialog.set_close_response("ok");

    let parent_widget: Option<&gtk4::Widget> = Some(parent.upcast_ref());
    dialog.choose(parent_widget, None::<&gtk4::gio::Cancellable>, move |response| {
        if response.as_str() == "breathe" {
            let _ = sender.try_send(AppEvent::EmergencyGoBreathe);
        }
    });
}
