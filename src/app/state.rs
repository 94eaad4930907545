use std::path::PathBuf;

use gtk4::glib;

use crate::breathing::Breather;
use crate::config::{Preferences, Settings};
use crate::music::MusicPlayer;
use crate::sessions::SessionLog;
use crate::speech::{Backend, Narrator};
use crate::stress::StressLevel;
use crate::ui::window::MainWindowWidgets;

/// Events delivered to the GTK main thread, from widgets and background tasks.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Start when idle, otherwise pause or resume.
    BreathingToggle,
    BreathingStop,
    FrameTick,
    StressChanged(u8),
    EmergencyRequested,
    EmergencyGoBreathe,
    StrategyActivated(&'static str),
    FavoriteChosen(&'static str),
    MusicToggle,
    MusicNext,
    MusicVolume(f64),
    SpeechFinished(Result<Backend, String>),
    PreferencesChanged(Preferences),
    ExportRequested,
    ExportTo(PathBuf),
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionLog,
    pub breather: Breather,
    pub stress: StressLevel,
    /// Stress level when the running breathing session began.
    pub stress_at_start: Option<StressLevel>,
    pub narrator: Narrator,
    pub music: MusicPlayer,
    pub tokio_rt: tokio::runtime::Runtime,
    pub event_sender: async_channel::Sender<AppEvent>,

    pub frame_source: Option<glib::SourceId>,

    // UI handles
    pub window: Option<MainWindowWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<AppEvent>) -> Self {
        let settings = Settings::load();
        let sessions = SessionLog::load();
        let breather = Breather::new(settings.breathing_pattern());
        let music = MusicPlayer::new(settings.music_volume);
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");

        Self {
            settings,
            sessions,
            breather,
            stress: StressLevel::default(),
            stress_at_start: None,
            narrator: Narrator::default(),
            music,
            tokio_rt,
            event_sender: sender,
            frame_source: None,
            window: None,
        }
    }

    pub fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings: {e}");
        }
    }

    pub fn save_sessions(&self) {
        if let Err(e) = self.sessions.save() {
            log::warn!("Failed to save sessions: {e}");
        }
    }

    /// Show a short message at the bottom of the main window.
    pub fn toast(&self, message: &str) {
        if let Some(ref window) = self.window {
            let toast = libadwaita::Toast::new(message);
            toast.set_timeout(3);
            window.toast_overlay.add_toast(toast);
        }
    }
}
