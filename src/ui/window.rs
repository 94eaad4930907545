use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::breathe_page::{build_breathe_page, BreatheWidgets};
use super::feeling_page::{build_feeling_page, FeelingWidgets};
use super::music_page::{build_music_page, MusicWidgets};
use super::strategies_page::{build_strategies_page, StrategiesWidgets};
use crate::app::AppEvent;
use crate::config::Settings;
use crate::music::Track;
use crate::stress::StressLevel;

pub const BREATHE_PAGE: &str = "breathe";

/// Handles returned from building the main window.
pub struct MainWindowWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub stack: libadwaita::ViewStack,
    pub toast_overlay: libadwaita::ToastOverlay,
    pub breathe: BreatheWidgets,
    pub strategies: StrategiesWidgets,
    pub feeling: FeelingWidgets,
    pub music: MusicWidgets,
}

/// Build the main window: header bar, four pages and a bottom view switcher.
pub fn build_main_window(
    app: &libadwaita::Application,
    settings: &Settings,
    stress: StressLevel,
    tracks: &[Track],
    sender: async_channel::Sender<AppEvent>,
) -> MainWindowWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Calming Room")
        .default_width(450)
        .default_height(650)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let menu_button = gtk4::MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");

    let menu = gtk4::gio::Menu::new();
    menu.append(Some("Export Sessions"), Some("win.export"));
    menu.append(Some("Preferences"), Some("app.preferences"));
    menu.append(Some("About Calming Room"), Some("app.about"));
    menu.append(Some("Quit"), Some("app.quit"));
    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    let export_button = gtk4::Button::builder()
        .icon_name("document-save-symbolic")
        .tooltip_text("Export sessions (Ctrl+E)")
        .action_name("win.export")
        .build();
    header.pack_end(&export_button);

    toolbar_view.add_top_bar(&header);

    // --- Pages ---
    let stack = libadwaita::ViewStack::new();

    let breathe = build_breathe_page(&settings.breathing_pattern(), sender.clone());
    stack.add_titled_with_icon(&breathe.page, Some(BREATHE_PAGE), "Breathe", "weather-clear-symbolic");

    let strategies = build_strategies_page(&settings.favorite_strategy, sender.clone());
    stack.add_titled_with_icon(
        &strategies.page,
        Some("strategies"),
        "Strategies",
        "view-list-symbolic",
    );

    let feeling = build_feeling_page(stress, sender.clone());
    stack.add_titled_with_icon(
        &feeling.page,
        Some("feeling"),
        "How do I feel?",
        "face-smile-symbolic",
    );

    let music = build_music_page(tracks, settings.music_volume, sender);
    stack.add_titled_with_icon(
        &music.page,
        Some("music"),
        "Music",
        "audio-x-generic-symbolic",
    );

    let toast_overlay = libadwaita::ToastOverlay::new();
    toast_overlay.set_child(Some(&stack));
    toolbar_view.set_content(Some(&toast_overlay));

    let switcher = libadwaita::ViewSwitcherBar::new();
    switcher.set_stack(Some(&stack));
    switcher.set_reveal(true);
    toolbar_view.add_bottom_bar(&switcher);

    window.set_content(Some(&toolbar_view));

    MainWindowWidgets {
        window,
        stack,
        toast_overlay,
        breathe,
        strategies,
        feeling,
        music,
    }
}

pub fn show_about(parent: &libadwaita::ApplicationWindow) {
    let dialog = libadwaita::AboutDialog::builder()
        .application_name("Calming Room")
        .application_icon(crate::APP_ID)
        .version(env!("CARGO_PKG_VERSION"))
        .developer_name("Daniel Nylander")
        .license_type(gtk4::License::Gpl30)
        .website("https://github.com/yeager/lugnarummet")
        .issue_url("https://github.com/yeager/lugnarummet/issues")
        .copyright("\u{a9} 2026 Daniel Nylander")
        .comments("Sensory regulation and calming strategies for autism and ADHD")
        .build();
    dialog.present(Some(parent));
}
