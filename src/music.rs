//! Looping background music.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "lugnarummet";
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "ogg", "opus", "wav"];
/// What rodio's default decoders handle. Opus files are listed but skipped.
const PLAYABLE_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];
pub const DEFAULT_VOLUME: f64 = 0.3;

struct Bundled {
    id: &'static str,
    file: &'static str,
    title: &'static str,
    composer: &'static str,
}

/// Tracks shipped with the package, installed under /usr/share/lugnarummet/music/.
const BUNDLED_TRACKS: [Bundled; 4] = [
    Bundled {
        id: "satie_gymnopedie1",
        file: "satie_gymnopedie1.mp3",
        title: "Gymnop\u{e9}die No. 1",
        composer: "Erik Satie",
    },
    Bundled {
        id: "debussy_clair_de_lune",
        file: "debussy_clair_de_lune.mp3",
        title: "Clair de Lune",
        composer: "Claude Debussy",
    },
    Bundled {
        id: "bach_air",
        file: "bach_air.mp3",
        title: "Air on the G String",
        composer: "J.S. Bach",
    },
    Bundled {
        id: "beethoven_moonlight",
        file: "beethoven_moonlight.mp3",
        title: "Moonlight Sonata",
        composer: "Ludwig van Beethoven",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub path: PathBuf,
    pub title: String,
    /// Empty for user-added files.
    pub composer: String,
}

impl Track {
    pub fn display_name(&self) -> String {
        if self.composer.is_empty() {
            self.title.clone()
        } else {
            format!("{} \u{2014} {}", self.composer, self.title)
        }
    }

    pub fn is_playable(&self) -> bool {
        has_extension(&self.path, &PLAYABLE_EXTENSIONS)
    }
}

/// Directories searched for music, in priority order.
pub fn music_dirs() -> Vec<PathBuf> {
    let mut dirs_out = vec![PathBuf::from("/usr/share").join(APP_NAME).join("music")];
    if let Some(data) = dirs::data_dir() {
        dirs_out.push(data.join(APP_NAME).join("music"));
    }
    if let Some(config) = dirs::config_dir() {
        dirs_out.push(config.join(APP_NAME).join("music"));
    }
    dirs_out
}

/// Bundled tracks that are installed, then any other audio file found.
pub fn discover(dirs: &[PathBuf]) -> Vec<Track> {
    let mut tracks: Vec<Track> = BUNDLED_TRACKS
        .iter()
        .filter_map(|b| {
            let path = dirs.iter().map(|d| d.join(b.file)).find(|p| p.is_file())?;
            Some(Track {
                id: b.id.to_string(),
                path,
                title: b.title.to_string(),
                composer: b.composer.to_string(),
            })
        })
        .collect();

    for dir in dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_audio(p))
            .collect();
        files.sort();

        for path in files {
            if tracks.iter().any(|t| t.path == path) {
                continue;
            }
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracks.push(Track {
                id: file_name,
                title: title_from_stem(&stem),
                composer: String::new(),
                path,
            });
        }
    }
    tracks
}

fn is_audio(path: &Path) -> bool {
    has_extension(path, &AUDIO_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// "rain_on_roof" -> "Rain On Roof"
pub fn title_from_stem(stem: &str) -> String {
    stem.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return DEFAULT_VOLUME;
    }
    volume.clamp(0.0, 1.0)
}

/// Index of the track after `current`, wrapping; first track when unknown.
pub fn next_index(tracks: &[Track], current: Option<&Path>) -> Option<usize> {
    if tracks.is_empty() {
        return None;
    }
    let idx = current
        .and_then(|c| tracks.iter().position(|t| t.path == c))
        .map_or(0, |i| (i + 1) % tracks.len());
    Some(idx)
}

/// Plays one track at a time on a loop. Lives on the GTK main thread.
pub struct MusicPlayer {
    dirs: Vec<PathBuf>,
    volume: f64,
    output: Option<(rodio::OutputStream, rodio::OutputStreamHandle)>,
    sink: Option<rodio::Sink>,
    current: Option<Track>,
}

impl MusicPlayer {
    pub fn new(volume: f64) -> Self {
        Self {
            dirs: music_dirs(),
            volume: clamp_volume(volume),
            output: None,
            sink: None,
            current: None,
        }
    }

    pub fn tracks(&self) -> Vec<Track> {
        discover(&self.dirs)
    }

    fn playable_tracks(&self) -> Vec<Track> {
        self.tracks().into_iter().filter(Track::is_playable).collect()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.is_paused())
    }

    fn has_loaded(&self) -> bool {
        self.sink.is_some()
    }

    /// Start `track`, or the first available one.
    pub fn play(&mut self, track: Option<Track>) -> Result<(), Box<dyn std::error::Error>> {
        let track = match track {
            Some(t) => t,
            None => self
                .playable_tracks()
                .into_iter()
                .next()
                .ok_or("No playable music files found")?,
        };
        if !track.is_playable() {
            return Err(format!(
                "{} cannot be played: unsupported audio format",
                track.display_name()
            )
            .into());
        }
        self.stop();

        if self.output.is_none() {
            self.output = Some(rodio::OutputStream::try_default()?);
        }
        let Some((_, handle)) = self.output.as_ref() else {
            return Err("No audio output".into());
        };

        let file = BufReader::new(File::open(&track.path)?);
        let source = rodio::Decoder::new_looped(file)?;
        let sink = rodio::Sink::try_new(handle)?;
        sink.set_volume(self.volume as f32);
        sink.append(source);
        sink.play();

        log::info!("Playing {} ({})", track.display_name(), track.id);
        self.sink = Some(sink);
        self.current = Some(track);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current = None;
    }

    pub fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    /// Pause when playing, resume when paused, otherwise start the first track.
    pub fn toggle(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else if self.has_loaded() {
            self.resume();
            Ok(())
        } else {
            self.play(None)
        }
    }

    pub fn play_next(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let tracks = self.playable_tracks();
        let current = self.current.as_ref().map(|t| t.path.clone());
        let idx = next_index(&tracks, current.as_deref()).ok_or("No playable music files found")?;
        self.play(tracks.into_iter().nth(idx))
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = clamp_volume(volume);
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume as f32);
        }
    }
}
