use gtk4::prelude::*;

use crate::app::AppEvent;
use crate::music::Track;

/// Handles returned from building the music page.
pub struct MusicWidgets {
    pub page: gtk4::Box,
    pub play_button: gtk4::Button,
    pub now_playing: gtk4::Label,
}

pub fn set_playing(widgets: &MusicWidgets, playing: bool, current: Option<&Track>) {
    if playing {
        widgets.play_button.set_icon_name("media-playback-pause-symbolic");
    } else {
        widgets.play_button.set_icon_name("media-playback-start-symbolic");
    }
    let text = match current {
        Some(track) if playing => format!("\u{266B} {}", track.display_name()),
        Some(track) => format!("Paused: {}", track.display_name()),
        None => String::new(),
    };
    widgets.now_playing.set_text(&text);
}

/// Build the background music page.
pub fn build_music_page(
    tracks: &[Track],
    volume: f64,
    sender: async_channel::Sender<AppEvent>,
) -> MusicWidgets {
    let page = gtk4::Box::new(gtk4::Orientation::Vertical, 16);
    page.set_margin_top(20);
    page.set_margin_bottom(20);
    page.set_margin_start(20);
    page.set_margin_end(20);
    page.set_valign(gtk4::Align::Center);

    let title = gtk4::Label::new(Some("Background Music"));
    title.add_css_class("title-1");
    page.append(&title);

    let subtitle = gtk4::Label::new(Some("Calming classical music for relaxation"));
    subtitle.add_css_class("dim-label");
    page.append(&subtitle);

    let now_playing = gtk4::Label::new(None);
    now_playing.add_css_class("dim-label");
    now_playing.set_margin_top(12);
    page.append(&now_playing);

    let controls = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    controls.set_halign(gtk4::Align::Center);

    let play_button = gtk4::Button::from_icon_name("media-playback-start-symbolic");
    play_button.add_css_class("circular");
    play_button.add_css_class("suggested-action");
    play_button.set_size_request(64, 64);
    play_button.set_tooltip_text(Some("Play / Pause"));
    let sender_for_play = sender.clone();
    play_button.connect_clicked(move |_| {
        let _ = sender_for_play.try_send(AppEvent::MusicToggle);
    });
    controls.append(&play_button);

    let next_button = gtk4::Button::from_icon_name("media-skip-forward-symbolic");
    next_button.add_css_class("circular");
    next_button.set_valign(gtk4::Align::Center);
    next_button.set_tooltip_text(Some("Next track"));
    let sender_for_next = sender.clone();
    next_button.connect_clicked(move |_| {
        let _ = sender_for_next.try_send(AppEvent::MusicNext);
    });
    controls.append(&next_button);
    page.append(&controls);

    let volume_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    volume_box.set_halign(gtk4::Align::Center);
    volume_box.set_margin_top(12);
    volume_box.append(&gtk4::Image::from_icon_name("audio-volume-medium-symbolic"));

    let volume_scale = gtk4::Scale::with_range(gtk4::Orientation::Horizontal, 0.0, 100.0, 5.0);
    volume_scale.set_value(volume * 100.0);
    volume_scale.set_size_request(200, -1);
    volume_scale.set_draw_value(false);
    volume_scale.connect_value_changed(move |scale| {
        let _ = sender.try_send(AppEvent::MusicVolume(scale.value() / 100.0));
    });
    volume_box.append(&volume_scale);
    page.append(&volume_box);

    if tracks.is_empty() {
        let empty = gtk4::Label::new(Some(
            "No music files found.\nAdd .mp3 files to ~/.config/lugnarummet/music/",
        ));
        empty.add_css_class("dim-label");
        empty.set_justify(gtk4::Justification::Center);
        empty.set_margin_top(16);
        page.append(&empty);
        play_button.set_sensitive(false);
        next_button.set_sensitive(false);
    } else {
        let list = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
        list.set_margin_top(16);
        for track in tracks {
            let row = gtk4::Label::new(Some(&format!("\u{1F3B5} {}", track.display_name())));
            row.add_css_class("dim-label");
            list.append(&row);
        }
        page.append(&list);
    }

    MusicWidgets {
        page,
        play_button,
        now_playing,
    }
}
