// Append-only persistence: per-device ledgers, raw-output archive,
// run summaries and their rotation

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::models::{CriticalMetric, CriticalSnapshot};

/// Wall-clock format used in ledger rows and summary headers.
pub const LEDGER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Compact variant used in artifact filenames.
const FILE_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Per-device history keyed by serial number, plus the run-level
/// artifacts, all under one data directory:
///
/// ```text
/// <data_dir>/<serial>/history.csv          append-only metric ledger
/// <data_dir>/<serial>/smartctl-<ts>.txt    verbatim diagnostic output
/// <data_dir>/summary-<ts>.txt              run summary artifact
/// <data_dir>/archive/                      rotated prior summaries
/// ```
///
/// Ledger rows are never rewritten or deleted; this is an audit trail.
/// Nothing here coordinates concurrent runs; the design assumes at most
/// one run active at a time.
pub struct HistoryStore {
    data_dir: PathBuf,
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Creates the data directory and moves prior run summaries into
    /// the archive subdirectory, so each run leaves exactly one current
    /// summary at the top level.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        let archive = self.data_dir.join("archive");
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("summary-") && name.ends_with(".txt") {
                fs::create_dir_all(&archive)?;
                fs::rename(entry.path(), archive.join(&name))
                    .with_context(|| format!("failed to archive {}", name))?;
            }
        }

        Ok(())
    }

    /// Returns the last snapshot recorded for a device, or None when no
    /// ledger exists yet or its tail row cannot be read back. A bad tail
    /// degrades to "no previous snapshot" so one corrupt row never takes
    /// the device out of evaluation.
    pub fn last_snapshot(&self, serial: &str) -> Result<Option<CriticalSnapshot>> {
        let path = self.ledger_path(serial);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("failed to open ledger {}", path.display()))?;

        let mut last = None;
        for record in reader.records() {
            match record {
                Ok(rec) => last = Some(rec),
                Err(e) => {
                    log::warn!("{}: unreadable ledger row: {}", path.display(), e);
                    last = None;
                }
            }
        }

        let Some(rec) = last else {
            return Ok(None);
        };
        let snapshot = parse_ledger_row(&rec);
        if snapshot.is_none() {
            log::warn!("{}: malformed last ledger row, ignoring history", path.display());
        }
        Ok(snapshot)
    }

    /// Appends one snapshot row to the device's ledger, creating it
    /// with the fixed four-column header on first use. Unknown metric
    /// values are written as empty cells, never dropped.
    pub fn append(&self, serial: &str, snapshot: &CriticalSnapshot) -> Result<()> {
        let dir = self.device_dir(serial);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = self.ledger_path(serial);
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open ledger {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            let mut header = vec!["Timestamp".to_string()];
            header.extend(
                CriticalMetric::ALL
                    .iter()
                    .map(|m| m.column_name().to_string()),
            );
            writer.write_record(&header)?;
        }

        let mut row = vec![snapshot.taken_at.format(LEDGER_TIME_FORMAT).to_string()];
        for metric in CriticalMetric::ALL {
            row.push(
                snapshot
                    .value(metric)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
        writer.flush()?;

        Ok(())
    }

    /// Stores the verbatim diagnostic output for one run, timestamped,
    /// under the device's directory. Pass-through archival only.
    pub fn archive_raw_output(
        &self,
        serial: &str,
        taken_at: NaiveDateTime,
        raw: &str,
    ) -> Result<PathBuf> {
        let dir = self.device_dir(serial);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join(format!("smartctl-{}.txt", taken_at.format(FILE_TIME_FORMAT)));
        fs::write(&path, raw)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Writes the run summary artifact for this run.
    pub fn write_summary(&self, started_at: NaiveDateTime, summary: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        let path = self
            .data_dir
            .join(format!("summary-{}.txt", started_at.format(FILE_TIME_FORMAT)));
        fs::write(&path, summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    fn device_dir(&self, serial: &str) -> PathBuf {
        self.data_dir.join(serial)
    }

    fn ledger_path(&self, serial: &str) -> PathBuf {
        self.device_dir(serial).join("history.csv")
    }
}

fn parse_ledger_row(rec: &csv::StringRecord) -> Option<CriticalSnapshot> {
    let taken_at = NaiveDateTime::parse_from_str(rec.get(0)?, LEDGER_TIME_FORMAT).ok()?;
    let mut snapshot = CriticalSnapshot::empty(taken_at);

    for (i, metric) in CriticalMetric::ALL.iter().enumerate() {
        let cell = rec.get(i + 1)?;
        let value = if cell.is_empty() {
            None
        } else {
            Some(cell.parse().ok()?)
        };
        snapshot.set_value(*metric, value);
    }

    Some(snapshot)
}
