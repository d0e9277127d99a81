//! Last-backup marker gating incremental re-export.
//!
//! `backuptime.txt` holds a single decimal unix timestamp with fractional
//! seconds, e.g. `1636112345.123456`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::model::Timestamp;

/// Manifest file name inside the archive root.
pub const MANIFEST_FILE: &str = "backuptime.txt";

/// The last successful backup of an archive, if any.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    last_backup: Option<DateTime<Utc>>,
}

impl Manifest {
    /// Read the manifest of the archive at `root`.
    ///
    /// A missing file means first run. An unparsable file is reported and
    /// also treated as first run, so everything is rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file exists but cannot be read.
    pub fn load(root: &Path) -> Result<Self, ExportError> {
        let path = root.join(MANIFEST_FILE);
        let last_backup = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let parsed = parse_unix_timestamp(&text);
                if parsed.is_none() {
                    warn!(
                        "Ignoring unreadable backup marker {:?} in {}; exporting everything",
                        text.trim(),
                        path.display()
                    );
                }
                parsed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ExportError::io(path, e)),
        };
        Ok(Self { path, last_backup })
    }

    /// Manifest for a run without a previous backup.
    #[must_use]
    pub fn first_run(root: &Path) -> Self {
        Self {
            path: root.join(MANIFEST_FILE),
            last_backup: None,
        }
    }

    /// Time of the last successful backup.
    #[must_use]
    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        self.last_backup
    }

    /// Decide whether an item (or attachment) must be written to `output`.
    ///
    /// Always on first run. Otherwise when the item changed strictly after
    /// the last backup, when its output file is missing, or when the server
    /// gave no modification time.
    #[must_use]
    pub fn needs_write(&self, modified: Option<&Timestamp>, output: &Path) -> bool {
        let Some(last_backup) = self.last_backup else {
            return true;
        };
        if !output.is_file() {
            debug!("{} missing locally", output.display());
            return true;
        }
        modified.is_none_or(|m| *m > last_backup)
    }

    /// Record `at` as the time of the last successful backup.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn store(&self, at: DateTime<Utc>) -> Result<(), ExportError> {
        std::fs::write(&self.path, format_unix_timestamp(at))
            .map_err(|e| ExportError::io(&self.path, e))
    }
}

fn format_unix_timestamp(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

fn parse_unix_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let (secs, frac) = text.split_once('.').unwrap_or((text, ""));
    if secs.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: i64 = secs.parse().ok()?;
    let nanos = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn ts(rfc3339: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn with_marker(content: &str) -> (TempDir, Manifest) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), content).unwrap();
        let manifest = Manifest::load(dir.path()).unwrap();
        (dir, manifest)
    }

    #[test]
    fn test_parse_python_style_float() {
        let parsed = parse_unix_timestamp("1636112345.123456\n").unwrap();
        assert_eq!(parsed.timestamp(), 1_636_112_345);
        assert_eq!(parsed.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_whole_seconds_and_long_fraction() {
        assert_eq!(parse_unix_timestamp("1600000000").unwrap().timestamp(), 1_600_000_000);
        let precise = parse_unix_timestamp("1600000000.1234567891").unwrap();
        assert_eq!(precise.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_unix_timestamp(""), None);
        assert_eq!(parse_unix_timestamp("yesterday"), None);
        assert_eq!(parse_unix_timestamp("1.6e9"), None);
        assert_eq!(parse_unix_timestamp(".5"), None);
    }

    #[test]
    fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();

        Manifest::first_run(dir.path()).store(at).unwrap();

        let text = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(text, "1709208000.000000");
        assert_eq!(Manifest::load(dir.path()).unwrap().last_backup(), Some(at));
    }

    #[test]
    fn test_missing_manifest_is_first_run() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.last_backup(), None);
        assert!(manifest.needs_write(
            Some(&ts("2000-01-01T00:00:00Z")),
            &dir.path().join("exists-or-not.html")
        ));
    }

    #[test]
    fn test_unparsable_manifest_is_first_run() {
        let (_dir, manifest) = with_marker("not a time");
        assert_eq!(manifest.last_backup(), None);
    }

    #[test]
    fn test_needs_write_rules() {
        // 2021-01-01T00:00:00Z
        let (dir, manifest) = with_marker("1609459200.0");
        let output = dir.path().join("1.html");
        std::fs::write(&output, "old").unwrap();

        assert!(manifest.needs_write(Some(&ts("2021-01-01T00:00:01Z")), &output));
        assert!(!manifest.needs_write(Some(&ts("2020-12-31T23:59:59Z")), &output));
        // Equal is not newer
        assert!(!manifest.needs_write(Some(&ts("2021-01-01T01:00:00+01:00")), &output));
        // No server time
        assert!(manifest.needs_write(None, &output));
        // Missing output
        assert!(manifest.needs_write(
            Some(&ts("2020-06-01T00:00:00Z")),
            &dir.path().join("2.html")
        ));
    }
}
