use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppEvent;
use crate::config::{
    Preferences, BREATHE_HOLD_RANGE, BREATHE_IN_RANGE, BREATHE_OUT_RANGE,
};
use crate::speech::TtsPreference;

const VOICES: [(&str, TtsPreference); 2] = [
    ("Natural (Piper)", TtsPreference::Neural),
    ("Classic (espeak-ng)", TtsPreference::RuleBased),
];

fn spin_row(title: &str, range: (u32, u32), value: u32) -> libadwaita::SpinRow {
    let row = libadwaita::SpinRow::with_range(range.0 as f64, range.1 as f64, 1.0);
    row.set_title(title);
    row.set_value(value as f64);
    row
}

/// Show the preferences dialog. Changes are sent when it closes.
pub fn show_preferences(
    parent: &libadwaita::ApplicationWindow,
    current: &Preferences,
    sender: async_channel::Sender<AppEvent>,
) {
    let dialog = libadwaita::PreferencesDialog::new();
    dialog.set_title("Preferences");

    // --- Breathing page ---
    let breathing_page = libadwaita::PreferencesPage::builder()
        .title("Breathing")
        .icon_name("weather-clear-symbolic")
        .build();

    let pattern_group = libadwaita::PreferencesGroup::new();
    pattern_group.set_title("Breathing Pattern");

    let in_row = spin_row("Breathe in (seconds)", BREATHE_IN_RANGE, current.breathe_in);
    let hold_row = spin_row("Hold (seconds)", BREATHE_HOLD_RANGE, current.breathe_hold);
    let out_row = spin_row("Breathe out (seconds)", BREATHE_OUT_RANGE, current.breathe_out);
    let rest_row = spin_row(
        "Rest after breathing out (seconds)",
        BREATHE_HOLD_RANGE,
        current.breathe_hold_out,
    );
    pattern_group.add(&in_row);
    pattern_group.add(&hold_row);
    pattern_group.add(&out_row);
    pattern_group.add(&rest_row);
    breathing_page.add(&pattern_group);
    dialog.add(&breathing_page);

    // --- Sound page ---
    let sound_page = libadwaita::PreferencesPage::builder()
        .title("Sound")
        .icon_name("audio-speakers-symbolic")
        .build();

    let speech_group = libadwaita::PreferencesGroup::new();
    speech_group.set_title("Spoken Guidance");

    let sound_row = libadwaita::SwitchRow::builder()
        .title("Read guidance aloud")
        .active(current.sound_enabled)
        .build();
    speech_group.add(&sound_row);

    let narrate_row = libadwaita::SwitchRow::builder()
        .title("Announce breathing phases")
        .subtitle("Say \u{201c}Breathe in\u{201d}, \u{201c}Hold\u{201d} and \u{201c}Breathe out\u{201d}")
        .active(current.narrate_breathing)
        .build();
    sound_row
        .bind_property("active", &narrate_row, "sensitive")
        .sync_create()
        .build();
    speech_group.add(&narrate_row);

    let voice_names: Vec<&str> = VOICES.iter().map(|(name, _)| *name).collect();
    let voice_model = gtk4::StringList::new(&voice_names);
    let selected = VOICES
        .iter()
        .position(|(_, pref)| *pref == current.tts_preference)
        .unwrap_or(0);
    let voice_row = libadwaita::ComboRow::builder()
        .title("Preferred voice")
        .subtitle("The other voice is used when this one is missing")
        .model(&voice_model)
        .selected(selected as u32)
        .build();
    sound_row
        .bind_property("active", &voice_row, "sensitive")
        .sync_create()
        .build();
    speech_group.add(&voice_row);

    sound_page.add(&speech_group);
    dialog.add(&sound_page);

    dialog.connect_closed(move |_| {
        let tts_preference = VOICES
            .get(voice_row.selected() as usize)
            .map_or(TtsPreference::Neural, |(_, pref)| *pref);
        let prefs = Preferences {
            breathe_in: in_row.value() as u32,
            breathe_hold: hold_row.value() as u32,
            breathe_out: out_row.value() as u32,
            breathe_hold_out: rest_row.value() as u32,
            sound_enabled: sound_row.is_active(),
            narrate_breathing: narrate_row.is_active(),
            tts_preference,
        };
        let _ = sender.try_send(AppEvent::PreferencesChanged(prefs));
    });

    dialog.present(Some(parent));
}
