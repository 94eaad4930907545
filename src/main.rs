mod app;
mod breathing;
mod config;
mod emergency;
mod music;
mod sessions;
mod speech;
mod strategies;
mod stress;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppEvent, AppState};

pub const APP_ID: &str = "se.danielnylander.lugnarummet";

fn main() {
    env_logger::init();
    log::info!("Calming Room starting");

    let application = libadwaita::Application::builder()
        .application_id(APP_ID)
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    // All widget signals and background results arrive on this channel
    let (event_tx, event_rx) = async_channel::unbounded::<AppEvent>();

    let state = Rc::new(RefCell::new(AppState::new(event_tx.clone())));

    // Build UI
    let main_window = {
        let s = state.borrow();
        let tracks = s.music.tracks();
        log::info!("Found {} music tracks", tracks.len());
        ui::window::build_main_window(app, &s.settings, s.stress, &tracks, event_tx.clone())
    };

    // Window action: export
    {
        let export_action = gtk4::gio::SimpleAction::new("export", None);
        let sender = event_tx.clone();
        export_action.connect_activate(move |_, _| {
            let _ = sender.try_send(AppEvent::ExportRequested);
        });
        main_window.window.add_action(&export_action);
        app.set_accels_for_action("win.export", &["<Control>e"]);
    }

    // App actions: preferences, about, quit
    {
        let preferences_action = gtk4::gio::SimpleAction::new("preferences", None);
        let state_clone = state.clone();
        let sender = event_tx.clone();
        preferences_action.connect_activate(move |_, _| {
            let s = state_clone.borrow();
            if let Some(ref window) = s.window {
                ui::preferences::show_preferences(
                    &window.window,
                    &s.settings.preferences(),
                    sender.clone(),
                );
            }
        });
        app.add_action(&preferences_action);

        let about_action = gtk4::gio::SimpleAction::new("about", None);
        let parent = main_window.window.clone();
        about_action.connect_activate(move |_, _| {
            ui::window::show_about(&parent);
        });
        app.add_action(&about_action);

        let quit_action = gtk4::gio::SimpleAction::new("quit", None);
        let app_clone = app.clone();
        quit_action.connect_activate(move |_, _| {
            // Closing runs the close-request handler below before quitting
            for window in app_clone.windows() {
                window.close();
            }
            app_clone.quit();
        });
        app.add_action(&quit_action);
        app.set_accels_for_action("app.quit", &["<Control>q"]);
    }

    // Log a running exercise and silence speech and music when the window goes away
    {
        let state_clone = state.clone();
        main_window.window.connect_close_request(move |_| {
            app::stop_breathing(&state_clone);
            if let Ok(mut s) = state_clone.try_borrow_mut() {
                s.narrator.stop();
                s.music.stop();
            }
            gtk4::glib::Propagation::Proceed
        });
    }

    main_window.window.present();
    state.borrow_mut().window = Some(main_window);

    // Attach app event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = event_rx.recv().await {
                app::handle_app_event(&state_clone, event);
            }
        });
    }
}
