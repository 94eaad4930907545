use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppEvent, AppState};

/// Speak `text` on the tokio runtime. Does nothing when sound is off.
pub fn narrate(state: &Rc<RefCell<AppState>>, text: &str) {
    let mut guard = state.borrow_mut();
    if !guard.settings.sound_enabled {
        log::debug!("Sound disabled, not narrating {text:?}");
        return;
    }
    let config = guard.settings.speech_config();
    let sender = guard.event_sender.clone();

    let s = &mut *guard;
    s.narrator
        .speak(&s.tokio_rt, config, text.to_string(), move |result| {
            let _ = sender.try_send(AppEvent::SpeechFinished(
                result.map_err(|e| e.to_string()),
            ));
        });
}

pub fn stop_narration(state: &Rc<RefCell<AppState>>) {
    state.borrow_mut().narrator.stop();
}
