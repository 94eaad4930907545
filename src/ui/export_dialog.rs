use chrono::Local;
use gtk4::prelude::*;

use crate::app::AppEvent;

/// Ask where to save the session log. The extension picks the format.
pub fn show_export_dialog(
    parent: &libadwaita::ApplicationWindow,
    sender: async_channel::Sender<AppEvent>,
) {
    let csv_filter = gtk4::FileFilter::new();
    csv_filter.set_name(Some("CSV (spreadsheet)"));
    csv_filter.add_suffix("csv");

    let json_filter = gtk4::FileFilter::new();
    json_filter.set_name(Some("JSON"));
    json_filter.add_suffix("json");

    let filters = gtk4::gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&csv_filter);
    filters.append(&json_filter);

    let dialog = gtk4::FileDialog::builder()
        .title("Export Sessions")
        .initial_name(format!(
            "lugnarummet-sessions-{}.csv",
            Local::now().format("%Y-%m-%d")
        ))
        .filters(&filters)
        .modal(true)
        .build();

    dialog.save(Some(parent), None::<&gtk4::gio::Cancellable>, move |result| {
        match result {
            Ok(file) => match file.path() {
                Some(path) => {
                    let _ = sender.try_send(AppEvent::ExportTo(path));
                }
                None => log::warn!("Export target has no local path: {}", file.uri()),
            },
            Err(e) => log::debug!("Export dialog dismissed: {e}"),
        }
    });
}
