use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::breathing::BreathingPattern;
use crate::speech::{SpeechConfig, TtsPreference};

/// User settings, persisted as JSON.
///
/// Unknown or missing keys fall back to their defaults so older files keep
/// loading after new settings are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub breathe_in: u32,
    pub breathe_hold: u32,
    pub breathe_out: u32,
    pub breathe_hold_out: u32,
    /// Strategy id (or, in older files, its display name). Empty means none.
    pub favorite_strategy: String,
    pub sound_enabled: bool,
    pub narrate_breathing: bool,
    pub tts_preference: TtsPreference,
    pub piper_model: String,
    pub piper_sample_rate: u32,
    pub espeak_voice: String,
    pub music_volume: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            breathe_in: 4,
            breathe_hold: 4,
            breathe_out: 6,
            breathe_hold_out: 0,
            favorite_strategy: String::new(),
            sound_enabled: true,
            narrate_breathing: false,
            tts_preference: TtsPreference::Neural,
            piper_model: "sv_SE-nst-medium".into(),
            piper_sample_rate: 22050,
            espeak_voice: "sv".into(),
            music_volume: 0.3,
        }
    }
}

/// The subset of settings edited in the preferences dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub breathe_in: u32,
    pub breathe_hold: u32,
    pub breathe_out: u32,
    pub breathe_hold_out: u32,
    pub sound_enabled: bool,
    pub narrate_breathing: bool,
    pub tts_preference: TtsPreference,
}

pub const BREATHE_IN_RANGE: (u32, u32) = (1, 10);
pub const BREATHE_HOLD_RANGE: (u32, u32) = (0, 10);
pub const BREATHE_OUT_RANGE: (u32, u32) = (1, 15);

impl Settings {
    /// Directory: ~/.config/lugnarummet/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("lugnarummet");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("settings.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        let settings: Self = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        settings.clamped()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Pull every numeric setting back into the range the preferences allow.
    pub fn clamped(mut self) -> Self {
        self.breathe_in = self.breathe_in.clamp(BREATHE_IN_RANGE.0, BREATHE_IN_RANGE.1);
        self.breathe_hold = self
            .breathe_hold
            .clamp(BREATHE_HOLD_RANGE.0, BREATHE_HOLD_RANGE.1);
        self.breathe_out = self.breathe_out.clamp(BREATHE_OUT_RANGE.0, BREATHE_OUT_RANGE.1);
        self.breathe_hold_out = self
            .breathe_hold_out
            .clamp(BREATHE_HOLD_RANGE.0, BREATHE_HOLD_RANGE.1);
        self.music_volume = crate::music::clamp_volume(self.music_volume);
        if self.piper_sample_rate == 0 {
            self.piper_sample_rate = Self::default().piper_sample_rate;
        }
        self
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            breathe_in: self.breathe_in,
            breathe_hold: self.breathe_hold,
            breathe_out: self.breathe_out,
            breathe_hold_out: self.breathe_hold_out,
            sound_enabled: self.sound_enabled,
            narrate_breathing: self.narrate_breathing,
            tts_preference: self.tts_preference,
        }
    }

    /// Apply edited preferences, leaving everything else untouched.
    pub fn apply(&mut self, prefs: Preferences) {
        self.breathe_in = prefs.breathe_in;
        self.breathe_hold = prefs.breathe_hold;
        self.breathe_out = prefs.breathe_out;
        self.breathe_hold_out = prefs.breathe_hold_out;
        self.sound_enabled = prefs.sound_enabled;
        self.narrate_breathing = prefs.narrate_breathing;
        self.tts_preference = prefs.tts_preference;
        *self = std::mem::take(self).clamped();
    }

    pub fn breathing_pattern(&self) -> BreathingPattern {
        BreathingPattern::from_secs(
            self.breathe_in,
            self.breathe_hold,
            self.breathe_out,
            self.breathe_hold_out,
        )
    }

    pub fn speech_config(&self) -> SpeechConfig {
        SpeechConfig {
            preference: self.tts_preference,
            piper_bin: std::env::var("PIPER_BIN").unwrap_or_else(|_| "piper".into()),
            piper_model: self.piper_model.clone(),
            piper_sample_rate: self.piper_sample_rate,
            espeak_bin: std::env::var("ESPEAK_BIN").unwrap_or_else(|_| "espeak-ng".into()),
            espeak_voice: self.espeak_voice.clone(),
            timeout: Duration::from_secs(10),
        }
    }
}
