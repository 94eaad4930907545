//! Spoken guidance through external TTS programs.
//!
//! Two backends are tried in preference order:
//! - Piper (neural): text on stdin, raw 16-bit mono PCM on stdout, played here
//! - espeak-ng (rule-based): speaks directly to the sound card
//!
//! A backend is only tried when its executable is found. When every backend
//! is missing or fails the caller gets the last error and narration is skipped.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Which kind of voice to try first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TtsPreference {
    #[default]
    Neural,
    RuleBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Piper,
    Espeak,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Piper => f.write_str("piper"),
            Backend::Espeak => f.write_str("espeak-ng"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("no speech backend found")]
    Unavailable,
    #[error("failed to start {backend}: {source}")]
    Spawn {
        backend: Backend,
        #[source]
        source: std::io::Error,
    },
    #[error("{backend} I/O error: {source}")]
    Io {
        backend: Backend,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} timed out after {1:?}")]
    Timeout(Backend, Duration),
    #[error("{0} exited with {1}")]
    Exit(Backend, ExitStatus),
    #[error("{0} produced no audio")]
    NoAudio(Backend),
    #[error("audio playback failed: {0}")]
    Playback(String),
    #[error("speech cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    pub preference: TtsPreference,
    pub piper_bin: String,
    pub piper_model: String,
    pub piper_sample_rate: u32,
    pub espeak_bin: String,
    pub espeak_voice: String,
    /// Upper bound for synthesis (piper) or the whole utterance (espeak-ng).
    pub timeout: Duration,
}

impl SpeechConfig {
    fn program(&self, backend: Backend) -> &str {
        match backend {
            Backend::Piper => &self.piper_bin,
            Backend::Espeak => &self.espeak_bin,
        }
    }

    /// Backends to try, in order, with the resolved executable for each.
    pub fn plan(&self) -> Vec<(Backend, PathBuf)> {
        self.plan_with(find_program)
    }

    pub fn plan_with<F>(&self, locate: F) -> Vec<(Backend, PathBuf)>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let order = match self.preference {
            TtsPreference::Neural => [Backend::Piper, Backend::Espeak],
            TtsPreference::RuleBased => [Backend::Espeak, Backend::Piper],
        };
        order
            .into_iter()
            .filter_map(|backend| match locate(self.program(backend)) {
                Some(path) => Some((backend, path)),
                None => {
                    log::debug!("{backend} not found ({})", self.program(backend));
                    None
                }
            })
            .collect()
    }
}

/// Locate `name` on `$PATH`, or check it directly when it is a path.
pub fn find_program(name: &str) -> Option<PathBuf> {
    find_in_path(name, std::env::var_os("PATH").as_deref())
}

pub fn find_in_path(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(name))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Decode signed 16-bit little-endian PCM. A trailing odd byte is dropped.
pub fn pcm_s16le_to_samples(raw: &[u8]) -> Vec<i16> {
    raw.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Speak `text` with the first backend that works.
pub async fn speak(
    config: &SpeechConfig,
    text: &str,
    cancel: Arc<AtomicBool>,
) -> Result<Backend, SpeechError> {
    let plan = config.plan();
    if plan.is_empty() {
        return Err(SpeechError::Unavailable);
    }

    let mut last_err = SpeechError::Unavailable;
    for (backend, program) in plan {
        if cancel.load(Ordering::Relaxed) {
            return Err(SpeechError::Cancelled);
        }
        let result = match backend {
            Backend::Piper => speak_piper(config, &program, text, cancel.clone()).await,
            Backend::Espeak => speak_espeak(config, &program, text).await,
        };
        match result {
            Ok(()) => return Ok(backend),
            Err(SpeechError::Cancelled) => return Err(SpeechError::Cancelled),
            Err(e) => {
                log::warn!("{backend} failed: {e}");
                last_err = e;
            }
        }
    }
    Err(last_err)
}

async fn speak_piper(
    config: &SpeechConfig,
    program: &Path,
    text: &str,
    cancel: Arc<AtomicBool>,
) -> Result<(), SpeechError> {
    let backend = Backend::Piper;
    let mut child = Command::new(program)
        .arg("--model")
        .arg(&config.piper_model)
        .arg("--output-raw")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SpeechError::Spawn { backend, source })?;

    // Piper synthesises per line and starts once stdin is closed.
    if let Some(mut stdin) = child.stdin.take() {
        let line = format!("{}\n", text.trim());
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|source| SpeechError::Io { backend, source })?;
    }

    let output = tokio::time::timeout(config.timeout, child.wait_with_output())
        .await
        .map_err(|_| SpeechError::Timeout(backend, config.timeout))?
        .map_err(|source| SpeechError::Io { backend, source })?;

    if !output.status.success() {
        return Err(SpeechError::Exit(backend, output.status));
    }

    let samples = pcm_s16le_to_samples(&output.stdout);
    if samples.is_empty() {
        return Err(SpeechError::NoAudio(backend));
    }
    log::debug!(
        "piper produced {:.1}s of audio",
        samples.len() as f32 / config.piper_sample_rate as f32
    );

    let sample_rate = config.piper_sample_rate;
    tokio::task::spawn_blocking(move || play_pcm(samples, sample_rate, &cancel))
        .await
        .map_err(|e| SpeechError::Playback(format!("playback task panicked: {e}")))?
}

async fn speak_espeak(config: &SpeechConfig, program: &Path, text: &str) -> Result<(), SpeechError> {
    let backend = Backend::Espeak;
    let mut cmd = Command::new(program);
    cmd.arg("-v")
        .arg(&config.espeak_voice)
        .arg(text)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = tokio::time::timeout(config.timeout, cmd.status())
        .await
        .map_err(|_| SpeechError::Timeout(backend, config.timeout))?
        .map_err(|source| SpeechError::Spawn { backend, source })?;

    if !status.success() {
        return Err(SpeechError::Exit(backend, status));
    }
    Ok(())
}

/// Play mono PCM on the default output device. Blocks until done or cancelled.
fn play_pcm(samples: Vec<i16>, sample_rate: u32, cancel: &AtomicBool) -> Result<(), SpeechError> {
    let (_stream, handle) = rodio::OutputStream::try_default()
        .map_err(|e| SpeechError::Playback(e.to_string()))?;
    let sink = rodio::Sink::try_new(&handle).map_err(|e| SpeechError::Playback(e.to_string()))?;
    sink.append(rodio::buffer::SamplesBuffer::new(1, sample_rate, samples));

    while !sink.empty() {
        if cancel.load(Ordering::Relaxed) {
            sink.stop();
            return Err(SpeechError::Cancelled);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

struct Utterance {
    task: tokio::task::JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

/// Owns the utterance in flight. Starting a new one cancels the previous.
#[derive(Default)]
pub struct Narrator {
    current: Option<Utterance>,
}

impl Narrator {
    pub fn speak<F>(
        &mut self,
        rt: &tokio::runtime::Runtime,
        config: SpeechConfig,
        text: String,
        on_done: F,
    ) where
        F: FnOnce(Result<Backend, SpeechError>) + Send + 'static,
    {
        self.stop();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let task = rt.spawn(async move {
            let result = speak(&config, &text, flag).await;
            on_done(result);
        });
        self.current = Some(Utterance { task, cancel });
    }

    /// Cancel speech in progress. Child processes are killed when their task drops.
    pub fn stop(&mut self) {
        if let Some(utterance) = self.current.take() {
            utterance.cancel.store(true, Ordering::Relaxed);
            utterance.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(preference: TtsPreference) -> SpeechConfig {
        SpeechConfig {
            preference,
            piper_bin: "piper".into(),
            piper_model: "sv_SE-nst-medium".into(),
            piper_sample_rate: 22050,
            espeak_bin: "espeak-ng".into(),
            espeak_voice: "sv".into(),
            timeout: Duration::from_secs(10),
        }
    }

    fn fake(names: &'static [&'static str]) -> impl Fn(&str) -> Option<PathBuf> {
        move |name| {
            names
                .iter()
                .any(|n| *n == name)
                .then(|| PathBuf::from("/usr/bin").join(name))
        }
    }

    fn backends(plan: Vec<(Backend, PathBuf)>) -> Vec<Backend> {
        plan.into_iter().map(|(b, _)| b).collect()
    }

    #[test]
    fn plan_prefers_configured_backend() {
        let both = fake(&["piper", "espeak-ng"]);
        assert_eq!(
            backends(config(TtsPreference::Neural).plan_with(&both)),
            vec![Backend::Piper, Backend::Espeak]
        );
        assert_eq!(
            backends(config(TtsPreference::RuleBased).plan_with(&both)),
            vec![Backend::Espeak, Backend::Piper]
        );
    }

    #[test]
    fn plan_skips_missing_backends() {
        let only_espeak = fake(&["espeak-ng"]);
        assert_eq!(
            backends(config(TtsPreference::Neural).plan_with(only_espeak)),
            vec![Backend::Espeak]
        );
        assert!(config(TtsPreference::Neural).plan_with(fake(&[])).is_empty());
    }

    #[test]
    fn pcm_decoding() {
        let raw = [0x01, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x42];
        assert_eq!(pcm_s16le_to_samples(&raw), vec![1, i16::MAX, i16::MIN]);
        assert!(pcm_s16le_to_samples(&[]).is_empty());
    }

    #[test]
    fn preference_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TtsPreference::RuleBased).unwrap(),
            "\"rule-based\""
        );
        let parsed: TtsPreference = serde_json::from_str("\"neural\"").unwrap();
        assert_eq!(parsed, TtsPreference::Neural);
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn finds_executables_on_path() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "espeak-ng", "exit 0");
        std::fs::write(dir.path().join("piper"), "not executable").unwrap();

        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(
            find_in_path("espeak-ng", Some(path_var.as_os_str())),
            Some(dir.path().join("espeak-ng"))
        );
        assert_eq!(find_in_path("piper", Some(path_var.as_os_str())), None);
        assert_eq!(find_in_path("espeak-ng", None), None);

        let absolute = dir.path().join("espeak-ng");
        assert_eq!(
            find_in_path(absolute.to_str().unwrap(), None),
            Some(absolute.clone())
        );
    }

    #[tokio::test]
    async fn nothing_installed_is_unavailable() {
        let mut cfg = config(TtsPreference::Neural);
        cfg.piper_bin = "/nonexistent/piper".into();
        cfg.espeak_bin = "/nonexistent/espeak-ng".into();

        let result = speak(&cfg, "hello", Arc::new(AtomicBool::new(false))).await;
        assert!(matches!(result, Err(SpeechError::Unavailable)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn falls_back_when_preferred_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let silent_piper = script(dir.path(), "piper", "cat > /dev/null\nexit 0");
        let broken_piper = script(dir.path(), "piper-broken", "cat > /dev/null\nexit 3");
        let espeak = script(dir.path(), "espeak-ng", "exit 0");
        let broken_espeak = script(dir.path(), "espeak-broken", "exit 1");

        let mut cfg = config(TtsPreference::Neural);
        cfg.espeak_bin = espeak.to_string_lossy().into_owned();

        // Piper that produces no audio.
        cfg.piper_bin = silent_piper.to_string_lossy().into_owned();
        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(false))).await;
        assert_eq!(result.unwrap(), Backend::Espeak);

        // Piper that exits non-zero.
        cfg.piper_bin = broken_piper.to_string_lossy().into_owned();
        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(false))).await;
        assert_eq!(result.unwrap(), Backend::Espeak);

        // Nothing works: the last failure is reported.
        cfg.espeak_bin = broken_espeak.to_string_lossy().into_owned();
        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(false))).await;
        assert!(matches!(result, Err(SpeechError::Exit(Backend::Espeak, _))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rule_based_preference_skips_piper() {
        let dir = tempfile::tempdir().unwrap();
        let espeak = script(dir.path(), "espeak-ng", "exit 0");

        let mut cfg = config(TtsPreference::RuleBased);
        cfg.piper_bin = "/nonexistent/piper".into();
        cfg.espeak_bin = espeak.to_string_lossy().into_owned();

        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(false))).await;
        assert_eq!(result.unwrap(), Backend::Espeak);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn falls_back_when_piper_hangs() {
        let dir = tempfile::tempdir().unwrap();
        let hanging_piper = script(dir.path(), "piper", "exec sleep 30");
        let espeak = script(dir.path(), "espeak-ng", "exit 0");

        let mut cfg = config(TtsPreference::Neural);
        cfg.piper_bin = hanging_piper.to_string_lossy().into_owned();
        cfg.espeak_bin = espeak.to_string_lossy().into_owned();
        cfg.timeout = Duration::from_millis(500);

        let started = std::time::Instant::now();
        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(false))).await;
        assert_eq!(result.unwrap(), Backend::Espeak);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    fn slow_espeak(dir: &Path, name: &str, marker: &Path) -> SpeechConfig {
        let espeak = script(
            dir,
            name,
            &format!("sleep 1\ntouch '{}'", marker.display()),
        );
        let mut cfg = config(TtsPreference::RuleBased);
        cfg.piper_bin = "/nonexistent/piper".into();
        cfg.espeak_bin = espeak.to_string_lossy().into_owned();
        cfg
    }

    #[cfg(unix)]
    #[test]
    fn stop_kills_the_running_backend() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spoken");
        let cfg = slow_espeak(dir.path(), "espeak-ng", &marker);

        let (tx, rx) = std::sync::mpsc::channel();
        let mut narrator = Narrator::default();
        narrator.speak(&rt, cfg, "hej".into(), move |result| {
            let _ = tx.send(result.is_ok());
        });
        std::thread::sleep(Duration::from_millis(200));
        narrator.stop();

        std::thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
        assert!(rx.try_recv().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn new_utterance_cancels_the_previous_one() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let first_marker = dir.path().join("first");
        let second_marker = dir.path().join("second");
        let first = slow_espeak(dir.path(), "espeak-first", &first_marker);
        let second = slow_espeak(dir.path(), "espeak-second", &second_marker);

        let (tx, rx) = std::sync::mpsc::channel();
        let mut narrator = Narrator::default();
        let first_tx = tx.clone();
        narrator.speak(&rt, first, "ett".into(), move |result| {
            let _ = first_tx.send(("first", result.is_ok()));
        });
        std::thread::sleep(Duration::from_millis(200));
        narrator.speak(&rt, second, "tv\u{e5}".into(), move |result| {
            let _ = tx.send(("second", result.is_ok()));
        });

        let done = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(done, ("second", true));
        assert!(second_marker.exists());
        assert!(!first_marker.exists());
        assert!(rx.try_recv().is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_before_start() {
        let mut cfg = config(TtsPreference::Neural);
        cfg.piper_bin = "/bin/sh".into();
        let result = speak(&cfg, "hej", Arc::new(AtomicBool::new(true))).await;
        assert!(matches!(result, Err(SpeechError::Cancelled)));
    }
}
