use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gtk4::glib;
use gtk4::prelude::*;

use super::narration::{narrate, stop_narration};
use super::state::{AppEvent, AppState};
use crate::breathing::{Control, Frame, Phase};
use crate::sessions::SessionLog;
use crate::stress::StressLevel;
use crate::ui::breathe_page::{set_exercise_status, ExerciseStatus};

/// ~33 fps redraw while the exercise runs.
const FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Circle click or Start/Pause button: start, pause or resume.
pub fn toggle_breathing(state: &Rc<RefCell<AppState>>) {
    let control = state.borrow().breather.toggle_control();
    apply(state, control);
}

/// Get the exercise moving: start it, or resume it when paused.
pub fn ensure_breathing(state: &Rc<RefCell<AppState>>) {
    let control = state.borrow().breather.ensure_control();
    if let Some(control) = control {
        apply(state, control);
    }
}

fn apply(state: &Rc<RefCell<AppState>>, control: Control) {
    match control {
        Control::Start => start_breathing(state),
        Control::Pause => pause_breathing(state),
        Control::Resume => resume_breathing(state),
    }
}

/// Start the exercise with the current pattern. No-op when already running.
fn start_breathing(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        if s.breather.is_running() {
            return;
        }
        let pattern = s.settings.breathing_pattern();
        log::info!(
            "Starting breathing exercise: {} ({}s per cycle)",
            pattern.summary(),
            pattern.cycle_duration().as_secs()
        );
        s.breather.set_pattern(pattern);
        s.breather.start(Instant::now());
        s.stress_at_start = Some(s.stress);
        if let Some(ref window) = s.window {
            set_exercise_status(&window.breathe, ExerciseStatus::Running);
        }
    }

    if state.borrow().settings.narrate_breathing {
        narrate(state, spoken(Phase::Inhale));
    }
    start_frame_timer(state);
}

fn pause_breathing(state: &Rc<RefCell<AppState>>) {
    log::info!("Pausing breathing exercise");
    stop_frame_timer(state);
    stop_narration(state);
    let mut s = state.borrow_mut();
    s.breather.pause(Instant::now());
    if let Some(ref window) = s.window {
        set_exercise_status(&window.breathe, ExerciseStatus::Paused);
    }
}

fn resume_breathing(state: &Rc<RefCell<AppState>>) {
    log::info!("Resuming breathing exercise");
    {
        let mut s = state.borrow_mut();
        s.breather.resume(Instant::now());
        if let Some(ref window) = s.window {
            set_exercise_status(&window.breathe, ExerciseStatus::Running);
        }
    }
    start_frame_timer(state);
}

/// Stop the exercise and log it as a session.
pub fn stop_breathing(state: &Rc<RefCell<AppState>>) {
    stop_frame_timer(state);
    stop_narration(state);

    let mut s = state.borrow_mut();
    let cycles = s.breather.cycles();
    let Some(ran) = s.breather.stop(Instant::now()) else {
        return;
    };
    log::info!(
        "Breathing exercise stopped after {:.0}s ({cycles} full cycles)",
        ran.as_secs_f64()
    );

    if let Some(ref window) = s.window {
        window.breathe.frame.set(Frame::default());
        window.breathe.area.queue_draw();
        set_exercise_status(&window.breathe, ExerciseStatus::Idle);
    }

    let before = s.stress_at_start.take();
    let after = s.stress;
    if record_exercise(&mut s.sessions, ran, before, after) {
        s.save_sessions();
    }
}

/// Log a finished exercise. Returns false when it ran too briefly to count.
fn record_exercise(
    sessions: &mut SessionLog,
    ran: Duration,
    before: Option<StressLevel>,
    after: StressLevel,
) -> bool {
    if ran.as_secs() == 0 {
        return false;
    }
    sessions.record(
        "breathing",
        ran.as_secs(),
        before.map(StressLevel::value),
        Some(after.value()),
    );
    true
}

/// Advance the animation one frame.
pub fn on_frame_tick(state: &Rc<RefCell<AppState>>) {
    let tick = state.borrow_mut().breather.tick(Instant::now());

    {
        let s = state.borrow();
        if let Some(ref window) = s.window {
            window.breathe.frame.set(tick.frame);
            window.breathe.area.queue_draw();
        }
    }

    if let Some(phase) = tick.entered {
        log::debug!("Breathing phase: {phase:?}");
        if state.borrow().settings.narrate_breathing {
            narrate(state, spoken(phase));
        }
    }
}

fn start_frame_timer(state: &Rc<RefCell<AppState>>) {
    stop_frame_timer(state);
    let sender = state.borrow().event_sender.clone();
    let source = glib::timeout_add_local(FRAME_INTERVAL, move || {
        let _ = sender.try_send(AppEvent::FrameTick);
        glib::ControlFlow::Continue
    });
    state.borrow_mut().frame_source = Some(source);
}

fn stop_frame_timer(state: &Rc<RefCell<AppState>>) {
    if let Some(source) = state.borrow_mut().frame_source.take() {
        source.remove();
    }
}

/// Phase label without the trailing ellipsis, for speech.
fn spoken(phase: Phase) -> &'static str {
    phase.label().trim_end_matches('\u{2026}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::{BreathingPattern, Breather};

    #[test]
    fn stopped_exercise_is_logged_with_stress_levels() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        breather.start(t0);
        let ran = breather.stop(t0 + Duration::from_secs(150)).unwrap();

        let mut sessions = SessionLog::default();
        let logged = record_exercise(
            &mut sessions,
            ran,
            Some(StressLevel::new(7)),
            StressLevel::new(4),
        );

        assert!(logged);
        let record = &sessions.records[0];
        assert_eq!(record.kind, "breathing");
        assert_eq!(record.duration, 3);
        assert_eq!(record.stress_before, Some(7));
        assert_eq!(record.stress_after, Some(4));
    }

    #[test]
    fn exercise_stopped_right_away_is_not_logged() {
        let mut sessions = SessionLog::default();
        let logged = record_exercise(
            &mut sessions,
            Duration::from_millis(400),
            None,
            StressLevel::default(),
        );
        assert!(!logged);
        assert!(sessions.records.is_empty());
    }

    #[test]
    fn spoken_phase_drops_the_ellipsis() {
        assert_eq!(spoken(Phase::Inhale), "Breathe in");
        assert_eq!(spoken(Phase::HoldOut), "Rest");
    }
}
