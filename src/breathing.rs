//! Breathing exercise timing.
//!
//! The exercise loops through inhale, hold, exhale and an optional rest until
//! stopped. Timing is driven by whatever `Instant`s the caller passes in, so the
//! GLib frame timer and the tests share one code path.

use std::time::{Duration, Instant};

/// Phase of the breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl Phase {
    /// Text drawn inside the circle and optionally narrated.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Tap to start",
            Phase::Inhale => "Breathe in\u{2026}",
            Phase::HoldIn => "Hold\u{2026}",
            Phase::Exhale => "Breathe out\u{2026}",
            Phase::HoldOut => "Rest\u{2026}",
        }
    }

    fn successor(self) -> Phase {
        match self {
            Phase::Idle | Phase::HoldOut => Phase::Inhale,
            Phase::Inhale => Phase::HoldIn,
            Phase::HoldIn => Phase::Exhale,
            Phase::Exhale => Phase::HoldOut,
        }
    }
}

/// Per-phase durations. Inhale and exhale are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingPattern {
    pub inhale: Duration,
    pub hold_in: Duration,
    pub exhale: Duration,
    pub hold_out: Duration,
}

impl Default for BreathingPattern {
    fn default() -> Self {
        Self::from_secs(4, 4, 6, 0)
    }
}

impl BreathingPattern {
    pub fn from_secs(inhale: u32, hold_in: u32, exhale: u32, hold_out: u32) -> Self {
        Self {
            inhale: Duration::from_secs(inhale.max(1) as u64),
            hold_in: Duration::from_secs(hold_in as u64),
            exhale: Duration::from_secs(exhale.max(1) as u64),
            hold_out: Duration::from_secs(hold_out as u64),
        }
    }

    pub fn duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Idle => Duration::ZERO,
            Phase::Inhale => self.inhale,
            Phase::HoldIn => self.hold_in,
            Phase::Exhale => self.exhale,
            Phase::HoldOut => self.hold_out,
        }
    }

    /// Length of one full loop.
    pub fn cycle_duration(&self) -> Duration {
        self.inhale + self.hold_in + self.exhale + self.hold_out
    }

    /// Next phase with a non-zero duration.
    pub fn next_phase(&self, phase: Phase) -> Phase {
        let mut next = phase.successor();
        while self.duration(next).is_zero() {
            next = next.successor();
        }
        next
    }

    /// "Breathe in 4s · Hold 4s · Breathe out 6s", with the rest appended when set.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Breathe in {}s \u{b7} Hold {}s \u{b7} Breathe out {}s",
            self.inhale.as_secs(),
            self.hold_in.as_secs(),
            self.exhale.as_secs()
        );
        if !self.hold_out.is_zero() {
            text.push_str(&format!(" \u{b7} Rest {}s", self.hold_out.as_secs()));
        }
        text
    }
}

/// What the breathing circle should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub phase: Phase,
    /// Fraction of the current phase elapsed, 0.0..=1.0.
    pub progress: f64,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            progress: 0.0,
        }
    }
}

impl Frame {
    /// Circle radius for a drawing area whose largest circle is `max_r`.
    pub fn radius(&self, max_r: f64) -> f64 {
        let min_r = max_r * 0.3;
        let p = self.progress.clamp(0.0, 1.0);
        match self.phase {
            Phase::Inhale => min_r + (max_r - min_r) * p,
            Phase::HoldIn => max_r,
            Phase::Exhale => max_r - (max_r - min_r) * p,
            Phase::HoldOut | Phase::Idle => min_r,
        }
    }
}

/// Result of advancing the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub frame: Frame,
    /// Set when the tick crossed into a new phase.
    pub entered: Option<Phase>,
}

#[derive(Debug, Clone)]
struct Run {
    phase: Phase,
    phase_start: Instant,
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    cycles: u32,
}

/// What a user control should do to the exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Resume,
}

/// Breathing state machine.
#[derive(Debug, Clone)]
pub struct Breather {
    pattern: BreathingPattern,
    run: Option<Run>,
}

impl Breather {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self { pattern, run: None }
    }

    /// Also applies to the phase in progress, from the next tick on.
    pub fn set_pattern(&mut self, pattern: BreathingPattern) {
        self.pattern = pattern;
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.paused_at.is_some())
    }

    /// Start/Pause/Resume button: start when idle, otherwise flip pause.
    pub fn toggle_control(&self) -> Control {
        match (self.is_running(), self.is_paused()) {
            (false, _) => Control::Start,
            (true, false) => Control::Pause,
            (true, true) => Control::Resume,
        }
    }

    /// Whatever gets the exercise moving; `None` when it already is.
    pub fn ensure_control(&self) -> Option<Control> {
        match self.toggle_control() {
            Control::Pause => None,
            control => Some(control),
        }
    }

    /// Completed loops since `start`.
    pub fn cycles(&self) -> u32 {
        self.run.as_ref().map_or(0, |r| r.cycles)
    }

    /// Begin at the start of an inhale. Restarts if already running.
    pub fn start(&mut self, now: Instant) {
        self.run = Some(Run {
            phase: Phase::Inhale,
            phase_start: now,
            started: now,
            paused_at: None,
            paused_total: Duration::ZERO,
            cycles: 0,
        });
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(run) = self.run.as_mut() {
            if run.paused_at.is_none() {
                run.paused_at = Some(now);
            }
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(run) = self.run.as_mut() {
            if let Some(paused_at) = run.paused_at.take() {
                let gap = now.saturating_duration_since(paused_at);
                run.phase_start += gap;
                run.paused_total += gap;
            }
        }
    }

    /// Stop and return how long the exercise actually ran, pauses excluded.
    pub fn stop(&mut self, now: Instant) -> Option<Duration> {
        let run = self.run.take()?;
        let end = run.paused_at.unwrap_or(now);
        Some(
            end.saturating_duration_since(run.started)
                .saturating_sub(run.paused_total),
        )
    }

    /// Advance to `now`. Overshoot past a phase boundary carries into the
    /// following phase so a loop always lasts exactly the pattern sum.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let pattern = self.pattern;
        let Some(run) = self.run.as_mut() else {
            return Tick {
                frame: Frame::default(),
                entered: None,
            };
        };
        let now = run.paused_at.unwrap_or(now);

        let mut entered = None;
        loop {
            let duration = pattern.duration(run.phase);
            if now.saturating_duration_since(run.phase_start) < duration {
                break;
            }
            run.phase_start += duration;
            let next = pattern.next_phase(run.phase);
            if next == Phase::Inhale {
                run.cycles += 1;
            }
            run.phase = next;
            entered = Some(next);
        }

        let elapsed = now.saturating_duration_since(run.phase_start);
        let duration = pattern.duration(run.phase);
        Tick {
            frame: Frame {
                phase: run.phase,
                progress: (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0),
            },
            entered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, secs: f64) -> Instant {
        start + Duration::from_secs_f64(secs)
    }

    #[test]
    fn default_cycle_is_pattern_sum() {
        let pattern = BreathingPattern::default();
        assert_eq!(pattern.cycle_duration(), Duration::from_secs(14));
    }

    #[test]
    fn idle_breather_reports_idle_frame() {
        let mut breather = Breather::new(BreathingPattern::default());
        let tick = breather.tick(Instant::now());
        assert_eq!(tick.frame.phase, Phase::Idle);
        assert_eq!(tick.entered, None);
        assert!(!breather.is_running());
    }

    #[test]
    fn walks_through_default_phases() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        breather.start(t0);

        let tick = breather.tick(at(t0, 2.0));
        assert_eq!(tick.frame.phase, Phase::Inhale);
        assert!((tick.frame.progress - 0.5).abs() < 1e-9);
        assert_eq!(tick.entered, None);

        let tick = breather.tick(at(t0, 4.0));
        assert_eq!(tick.entered, Some(Phase::HoldIn));

        let tick = breather.tick(at(t0, 8.0));
        assert_eq!(tick.entered, Some(Phase::Exhale));

        // Zero-length rest is skipped straight back to inhale.
        let tick = breather.tick(at(t0, 14.0));
        assert_eq!(tick.entered, Some(Phase::Inhale));
        assert_eq!(breather.cycles(), 1);
    }

    #[test]
    fn every_loop_lasts_the_pattern_sum() {
        let pattern = BreathingPattern::from_secs(3, 2, 5, 1);
        let t0 = Instant::now();
        let mut breather = Breather::new(pattern);
        breather.start(t0);

        for n in 1..=5u32 {
            let end = at(t0, 11.0 * n as f64);
            let before = breather.tick(end - Duration::from_millis(1));
            assert_eq!(before.frame.phase, Phase::HoldOut);

            let tick = breather.tick(end);
            assert_eq!(tick.frame.phase, Phase::Inhale);
            assert_eq!(tick.frame.progress, 0.0);
            assert_eq!(breather.cycles(), n);
        }
    }

    #[test]
    fn overshoot_carries_into_next_phase() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        breather.start(t0);

        let tick = breather.tick(at(t0, 4.5));
        assert_eq!(tick.frame.phase, Phase::HoldIn);
        assert!((tick.frame.progress - 0.125).abs() < 1e-9);
    }

    #[test]
    fn long_gap_skips_several_phases() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        breather.start(t0);

        let tick = breather.tick(at(t0, 30.0));
        assert_eq!(tick.frame.phase, Phase::Inhale);
        assert_eq!(breather.cycles(), 2);
        assert!((tick.frame.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_hold_is_skipped() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::from_secs(4, 0, 6, 0));
        breather.start(t0);

        let tick = breather.tick(at(t0, 4.0));
        assert_eq!(tick.entered, Some(Phase::Exhale));
    }

    #[test]
    fn inhale_and_exhale_never_zero() {
        let pattern = BreathingPattern::from_secs(0, 0, 0, 0);
        assert_eq!(pattern.inhale, Duration::from_secs(1));
        assert_eq!(pattern.exhale, Duration::from_secs(1));
        assert_eq!(pattern.cycle_duration(), Duration::from_secs(2));
    }

    #[test]
    fn pause_freezes_progress() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        breather.start(t0);

        breather.pause(at(t0, 2.0));
        assert!(breather.is_paused());
        let tick = breather.tick(at(t0, 9.0));
        assert_eq!(tick.frame.phase, Phase::Inhale);
        assert!((tick.frame.progress - 0.5).abs() < 1e-9);

        breather.resume(at(t0, 10.0));
        let tick = breather.tick(at(t0, 12.0));
        assert_eq!(tick.entered, Some(Phase::HoldIn));

        let ran = breather.stop(at(t0, 12.0)).unwrap();
        assert_eq!(ran, Duration::from_secs(4));
        assert!(!breather.is_running());
    }

    #[test]
    fn toggle_control_cycles_start_pause_resume() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        assert_eq!(breather.toggle_control(), Control::Start);

        breather.start(t0);
        assert_eq!(breather.toggle_control(), Control::Pause);

        breather.pause(at(t0, 2.0));
        assert_eq!(breather.toggle_control(), Control::Resume);
    }

    #[test]
    fn ensure_control_resumes_a_paused_exercise() {
        let t0 = Instant::now();
        let mut breather = Breather::new(BreathingPattern::default());
        assert_eq!(breather.ensure_control(), Some(Control::Start));

        breather.start(t0);
        assert_eq!(breather.ensure_control(), None);

        breather.pause(at(t0, 3.0));
        assert_eq!(breather.ensure_control(), Some(Control::Resume));

        breather.resume(at(t0, 10.0));
        assert_eq!(breather.ensure_control(), None);
        let tick = breather.tick(at(t0, 12.0));
        assert_eq!(tick.frame.phase, Phase::HoldIn);
    }

    #[test]
    fn stop_when_idle_returns_none() {
        let mut breather = Breather::new(BreathingPattern::default());
        assert_eq!(breather.stop(Instant::now()), None);
    }

    #[test]
    fn radius_follows_phase() {
        let max_r = 100.0;
        let frame = |phase, progress| Frame { phase, progress };
        assert_eq!(Frame::default().radius(max_r), 30.0);
        assert_eq!(frame(Phase::Inhale, 0.5).radius(max_r), 65.0);
        assert_eq!(frame(Phase::HoldIn, 0.3).radius(max_r), 100.0);
        assert_eq!(frame(Phase::Exhale, 1.0).radius(max_r), 30.0);
        assert_eq!(frame(Phase::HoldOut, 0.5).radius(max_r), 30.0);
    }

    #[test]
    fn summary_mentions_rest_only_when_set() {
        assert_eq!(
            BreathingPattern::default().summary(),
            "Breathe in 4s \u{b7} Hold 4s \u{b7} Breathe out 6s"
        );
        assert!(BreathingPattern::from_secs(4, 4, 6, 2)
            .summary()
            .ends_with("Rest 2s"));
    }
}
