use std::cell::RefCell;
use std::rc::Rc;

use super::exercise::{ensure_breathing, on_frame_tick, stop_breathing, toggle_breathing};
use super::narration::narrate;
use super::state::{AppEvent, AppState};
use crate::emergency;
use crate::sessions::ExportFormat;
use crate::strategies;
use crate::stress::StressLevel;
use crate::ui;

/// Handle an app event. This is the core state machine.
pub fn handle_app_event(state: &Rc<RefCell<AppState>>, event: AppEvent) {
    match event {
        AppEvent::BreathingToggle => toggle_breathing(state),
        AppEvent::BreathingStop => stop_breathing(state),
        AppEvent::FrameTick => on_frame_tick(state),
        AppEvent::StressChanged(value) => {
            let mut s = state.borrow_mut();
            let level = StressLevel::new(value);
            if level != s.stress {
                log::debug!("Stress level {}", level.value());
            }
            s.stress = level;
            if let Some(ref window) = s.window {
                ui::feeling_page::set_stress(&window.feeling, level);
            }
        }
        AppEvent::EmergencyRequested => on_emergency(state),
        AppEvent::EmergencyGoBreathe => {
            if let Some(ref window) = state.borrow().window {
                window.stack.set_visible_child_name(ui::window::BREATHE_PAGE);
            }
            ensure_breathing(state);
        }
        AppEvent::StrategyActivated(id) => {
            if let Some(strategy) = strategies::by_id(id) {
                log::info!("Strategy activated: {}", strategy.name);
                narrate(state, &strategy.narration());
            }
        }
        AppEvent::FavoriteChosen(id) => {
            let mut s = state.borrow_mut();
            let already = strategies::lookup(&s.settings.favorite_strategy).map(|f| f.id);
            if already == Some(id) {
                log::info!("Cleared favorite strategy");
                s.settings.favorite_strategy.clear();
            } else {
                log::info!("Favorite strategy: {id}");
                s.settings.favorite_strategy = id.to_string();
            }
            s.save_settings();
            if let Some(ref window) = s.window {
                ui::strategies_page::set_favorite(&window.strategies, &s.settings.favorite_strategy);
            }
        }
        AppEvent::MusicToggle => {
            let result = state.borrow_mut().music.toggle();
            after_music_change(state, result);
        }
        AppEvent::MusicNext => {
            let result = state.borrow_mut().music.play_next();
            after_music_change(state, result);
        }
        AppEvent::MusicVolume(volume) => {
            let mut s = state.borrow_mut();
            s.music.set_volume(volume);
            s.settings.music_volume = s.music.volume();
            s.save_settings();
        }
        AppEvent::SpeechFinished(result) => match result {
            Ok(backend) => log::info!("Narrated with {backend}"),
            Err(e) => log::warn!("Narration skipped: {e}"),
        },
        AppEvent::PreferencesChanged(prefs) => {
            let mut s = state.borrow_mut();
            if prefs == s.settings.preferences() {
                return;
            }
            s.settings.apply(prefs);
            s.save_settings();
            let pattern = s.settings.breathing_pattern();
            s.breather.set_pattern(pattern);
            if !s.settings.sound_enabled {
                s.narrator.stop();
            }
            if let Some(ref window) = s.window {
                window.breathe.pattern_label.set_text(&pattern.summary());
            }
            log::info!("Preferences updated: {}", pattern.summary());
        }
        AppEvent::ExportRequested => {
            let s = state.borrow();
            if let Some(ref window) = s.window {
                ui::export_dialog::show_export_dialog(&window.window, s.event_sender.clone());
            }
        }
        AppEvent::ExportTo(path) => {
            let s = state.borrow();
            match s.sessions.export(&path) {
                Ok(format) => {
                    let kind = match format {
                        ExportFormat::Csv => "CSV",
                        ExportFormat::Json => "JSON",
                    };
                    log::info!(
                        "Exported {} sessions as {kind} to {}",
                        s.sessions.records.len(),
                        path.display()
                    );
                    s.toast(&format!("Exported {} sessions", s.sessions.records.len()));
                }
                Err(e) => {
                    log::error!("Export failed: {e}");
                    s.toast(&format!("Export failed: {e}"));
                }
            }
        }
    }
}

fn on_emergency(state: &Rc<RefCell<AppState>>) {
    let guidance = {
        let mut s = state.borrow_mut();
        let guidance = emergency::resolve(&s.settings.favorite_strategy);
        log::info!(
            "Emergency requested, favorite: {}",
            guidance.strategy.map_or("none", |st| st.id)
        );
        let level = s.stress.value();
        s.sessions.record("emergency", 0, Some(level), None);
        s.save_sessions();
        guidance
    };

    narrate(state, emergency::SPOKEN_REASSURANCE);

    let s = state.borrow();
    if let Some(ref window) = s.window {
        ui::emergency_dialog::show_emergency_dialog(
            &window.window,
            &guidance,
            s.event_sender.clone(),
        );
    }
}

fn after_music_change(state: &Rc<RefCell<AppState>>, result: Result<(), Box<dyn std::error::Error>>) {
    let s = state.borrow();
    if let Err(e) = result {
        log::warn!("Music playback failed: {e}");
        s.toast(&format!("Could not play music: {e}"));
    }
    if let Some(ref window) = s.window {
        ui::music_page::set_playing(&window.music, s.music.is_playing(), s.music.current_track());
    }
}
