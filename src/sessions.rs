use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Only the newest records are kept on disk.
pub const MAX_SESSIONS: usize = 200;

/// One logged calming session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Local time, "YYYY-MM-DD HH:MM".
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Whole minutes.
    pub duration: u32,
    #[serde(default)]
    pub stress_before: Option<u8>,
    #[serde(default)]
    pub stress_after: Option<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent session history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLog {
    pub records: Vec<SessionRecord>,
}

impl SessionLog {
    /// Directory: ~/.local/share/lugnarummet/
    fn dir() -> PathBuf {
        let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("lugnarummet");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("sessions.json")
    }

    /// Load from disk, returning an empty log if missing.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        let records = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Self { records }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Append a session stamped with the current local time.
    pub fn record(
        &mut self,
        kind: &str,
        duration_secs: u64,
        stress_before: Option<u8>,
        stress_after: Option<u8>,
    ) {
        self.push(SessionRecord {
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            kind: kind.to_string(),
            duration: minutes(duration_secs),
            stress_before,
            stress_after,
        });
    }

    pub fn push(&mut self, record: SessionRecord) {
        self.records.push(record);
        if self.records.len() > MAX_SESSIONS {
            let excess = self.records.len() - MAX_SESSIONS;
            self.records.drain(..excess);
        }
    }

    /// Write the log to `path`: JSON for a `.json` extension, CSV otherwise.
    pub fn export(&self, path: &Path) -> Result<ExportFormat, ExportError> {
        let format = ExportFormat::for_path(path);
        let bytes = match format {
            ExportFormat::Json => {
                let mut data = serde_json::to_vec_pretty(&self.records)?;
                data.push(b'\n');
                data
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(["date", "type", "duration", "stress_before", "stress_after"])?;
                for record in &self.records {
                    writer.serialize((
                        &record.date,
                        &record.kind,
                        record.duration,
                        record.stress_before,
                        record.stress_after,
                    ))?;
                }
                writer
                    .into_inner()
                    .map_err(|e| ExportError::Csv(e.into_error().into()))?
            }
        };
        fs::write(path, bytes).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Round to the nearest minute; anything that ran at all counts as one.
fn minutes(secs: u64) -> u32 {
    if secs == 0 {
        return 0;
    }
    ((secs + 30) / 60).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, duration: u32) -> SessionRecord {
        SessionRecord {
            date: "2026-03-01 09:15".into(),
            kind: kind.into(),
            duration,
            stress_before: Some(7),
            stress_after: None,
        }
    }

    #[test]
    fn minutes_rounding() {
        assert_eq!(minutes(0), 0);
        assert_eq!(minutes(10), 1);
        assert_eq!(minutes(89), 1);
        assert_eq!(minutes(90), 2);
        assert_eq!(minutes(600), 10);
    }

    #[test]
    fn keeps_only_newest_records() {
        let mut log = SessionLog::default();
        for i in 0..(MAX_SESSIONS as u32 + 5) {
            log.push(record("breathing", i));
        }
        assert_eq!(log.records.len(), MAX_SESSIONS);
        assert_eq!(log.records[0].duration, 5);
        assert_eq!(log.records.last().unwrap().duration, MAX_SESSIONS as u32 + 4);
    }

    #[test]
    fn record_stamps_date() {
        let mut log = SessionLog::default();
        log.record("emergency", 0, Some(9), None);
        let r = &log.records[0];
        assert_eq!(r.kind, "emergency");
        assert_eq!(r.date.len(), "YYYY-MM-DD HH:MM".len());
        assert_eq!(r.stress_before, Some(9));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("sessions.json");
        let mut log = SessionLog::default();
        log.push(record("breathing", 3));
        log.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"type\": \"breathing\""));
        assert_eq!(SessionLog::load_from(&path), log);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(&path, "[{").unwrap();
        assert!(SessionLog::load_from(&path).records.is_empty());
    }

    #[test]
    fn exports_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let mut log = SessionLog::default();
        log.push(record("breathing", 3));

        assert_eq!(log.export(&path).unwrap(), ExportFormat::Csv);
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "date,type,duration,stress_before,stress_after");
        assert_eq!(lines[1], "2026-03-01 09:15,breathing,3,7,");
    }

    #[test]
    fn exports_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.JSON");
        let mut log = SessionLog::default();
        log.push(record("emergency", 0));

        assert_eq!(log.export(&path).unwrap(), ExportFormat::Json);
        let parsed: Vec<SessionRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, log.records);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sessions.csv");
        let err = SessionLog::default().export(&path).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
