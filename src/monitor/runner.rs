// Per-run pipeline orchestration with per-device error containment

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use crate::history::HistoryStore;
use crate::models::DeviceReport;
use crate::monitor::{attributes, critical, evaluator, regression, scanner, smartctl};
use crate::report;

/// What one invocation operates on.
pub struct RunConfig {
    /// Root directory for ledgers, archives and summaries
    pub data_dir: PathBuf,
    /// Explicit device paths; empty means enumerate /dev
    pub devices: Vec<PathBuf>,
    /// Keep a verbatim copy of each device's diagnostic output
    pub archive_raw: bool,
    /// Evaluate and report without writing anything
    pub dry_run: bool,
}

/// Totals for one completed run.
pub struct RunOutcome {
    pub summary: String,
    pub evaluated: usize,
    pub skipped: usize,
    pub failures: usize,
}

/// Runs the whole pipeline once: enumerate, gate, evaluate, persist,
/// summarize. Devices are processed sequentially in scan order; a
/// failure on one device is logged and counted but never aborts the
/// remaining devices.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let store = HistoryStore::new(&config.data_dir);
    if !config.dry_run {
        store.prepare()?;
    }

    let devices = if config.devices.is_empty() {
        scanner::candidate_devices()?
    } else {
        config.devices.clone()
    };
    log::info!("probing {} device(s)", devices.len());

    let started_at = Local::now().naive_local();
    let mut reports = Vec::new();
    let mut skipped = 0;
    let mut failures = 0;

    for dev in &devices {
        match evaluate_device(&store, dev, config) {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => skipped += 1,
            Err(e) => {
                log::error!("{}: evaluation failed: {:#}", dev.display(), e);
                failures += 1;
            }
        }
    }

    let summary = report::render_run_summary(started_at, &reports, skipped, failures);
    if !config.dry_run {
        let path = store.write_summary(started_at, &summary)?;
        log::debug!("summary written to {}", path.display());
    }

    Ok(RunOutcome {
        summary,
        evaluated: reports.len(),
        skipped,
        failures,
    })
}

/// Probes one device. Ok(None) means the device was skipped (no
/// self-monitoring capability, or no usable identity), not an error.
fn evaluate_device(
    store: &HistoryStore,
    dev: &Path,
    config: &RunConfig,
) -> Result<Option<DeviceReport>> {
    if !smartctl::smart_enabled(dev)? {
        log::info!("{}: self-monitoring not enabled, skipping", dev.display());
        return Ok(None);
    }

    let raw = smartctl::full_output(dev)?;
    let Some(serial) = smartctl::serial_number(&raw) else {
        log::warn!(
            "{}: no serial number in diagnostic output, skipping",
            dev.display()
        );
        return Ok(None);
    };

    let taken_at = Local::now().naive_local();
    let mut report = process_device_output(
        store,
        &serial,
        &dev.display().to_string(),
        &raw,
        taken_at,
        !config.dry_run,
    )?;

    if config.archive_raw && !config.dry_run {
        store.archive_raw_output(&serial, taken_at, &raw)?;
    }

    if let Some(name) = dev.file_name() {
        report.partitions = scanner::partitions_for(&name.to_string_lossy());
    }

    Ok(Some(report))
}

/// The core pipeline for one device's raw diagnostic text: parse the
/// attribute table, extract the critical snapshot, evaluate, compare
/// against the last recorded snapshot, then append the new one.
///
/// The previous snapshot is read before the append, so regressions are
/// judged against the ledger as it stood when the run began.
pub fn process_device_output(
    store: &HistoryStore,
    serial: &str,
    path: &str,
    raw: &str,
    taken_at: NaiveDateTime,
    persist: bool,
) -> Result<DeviceReport> {
    let table = attributes::parse_attribute_table(raw);
    log::debug!("{}: {} attribute row(s)", serial, table.len());

    let snapshot = critical::extract_critical_metrics(raw, taken_at);
    let health = evaluator::evaluate(&table, &snapshot);

    let previous = store
        .last_snapshot(serial)
        .with_context(|| format!("failed to read history for {}", serial))?;
    let regressions = regression::detect_regressions(previous.as_ref(), &snapshot);

    if persist {
        store
            .append(serial, &snapshot)
            .with_context(|| format!("failed to append history for {}", serial))?;
    }

    Ok(DeviceReport {
        serial: serial.to_string(),
        path: path.to_string(),
        model: smartctl::model(raw),
        health,
        regressions,
        partitions: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    // Synthetic smartctl -a output with a configurable leading row and
    // configurable critical-metric raw values.
    fn raw_output(
        serial: &str,
        lead: (u32, u32, u32),
        realloc: u64,
        pending: u64,
        uncorr: u64,
    ) -> String {
        let (current, worst, threshold) = lead;
        format!(
            "\
smartctl 7.4 2023-08-01 r5530 [x86_64-linux-6.5.0] (local build)
Device Model:     TestDisk 2000
Serial Number:    {serial}

=== START OF READ SMART DATA SECTION ===
Vendor Specific SMART Attributes with Thresholds:
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  1 Raw_Read_Error_Rate     0x002f   {current}   {worst}   {threshold}    Pre-fail  Always       -       0
  5 Reallocated_Sector_Ct   0x0033   200   200   140    Pre-fail  Always       -       {realloc}
197 Current_Pending_Sector  0x0032   200   200   000    Old_age   Always       -       {pending}
198 Offline_Uncorrectable   0x0030   100   253   000    Old_age   Offline      -       {uncorr}

SMART Error Log Version: 1
"
        )
    }

    #[test]
    fn test_three_run_scenario_good_then_warn_then_bad() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        let run1 = raw_output("TST-1", (10, 10, 5), 0, 0, 0);
        let r1 = process_device_output(&store, "TST-1", "/dev/sda", &run1, at(9), true).unwrap();
        assert_eq!(r1.health.verdict, Verdict::Good);
        assert!(r1.health.reasons.is_empty());
        assert!(r1.regressions.is_empty());
        assert_eq!(r1.model.as_deref(), Some("TestDisk 2000"));

        let run2 = raw_output("TST-1", (10, 4, 5), 0, 0, 0);
        let r2 = process_device_output(&store, "TST-1", "/dev/sda", &run2, at(10), true).unwrap();
        assert_eq!(r2.health.verdict, Verdict::Warn);
        assert_eq!(
            r2.health.reasons,
            vec!["attribute(s) have previously dipped below threshold".to_string()]
        );

        let run3 = raw_output("TST-1", (4, 4, 5), 0, 0, 0);
        let r3 = process_device_output(&store, "TST-1", "/dev/sda", &run3, at(11), true).unwrap();
        assert_eq!(r3.health.verdict, Verdict::Bad);
        assert!(
            r3.health
                .reasons
                .contains(&"attribute(s) are currently below threshold".to_string())
        );

        // one ledger row per run, plus the header
        let ledger =
            std::fs::read_to_string(dir.path().join("TST-1").join("history.csv")).unwrap();
        assert_eq!(ledger.lines().count(), 4);
    }

    #[test]
    fn test_reallocated_increase_is_bad_with_regression_finding() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        let run1 = raw_output("TST-2", (200, 200, 51), 0, 0, 0);
        let r1 = process_device_output(&store, "TST-2", "/dev/sdb", &run1, at(9), true).unwrap();
        assert_eq!(r1.health.verdict, Verdict::Good);

        let run2 = raw_output("TST-2", (200, 200, 51), 3, 0, 0);
        let r2 = process_device_output(&store, "TST-2", "/dev/sdb", &run2, at(10), true).unwrap();
        assert_eq!(r2.health.verdict, Verdict::Bad);
        assert_eq!(
            r2.health.reasons,
            vec!["critical attribute(s) are above zero".to_string()]
        );
        assert_eq!(
            r2.regressions,
            vec!["ReallocatedSectorCount increased from 0 to 3".to_string()]
        );
    }

    #[test]
    fn test_unparseable_output_still_evaluates_critical_metrics() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        // no attribute-table marker at all
        let raw = "Serial Number: TST-3\n197 Current_Pending_Sector  0x0032   200   200   000    Old_age   Always       -       2\n";
        let report = process_device_output(&store, "TST-3", "/dev/sdc", raw, at(9), true).unwrap();
        assert_eq!(report.health.verdict, Verdict::Bad);
        assert_eq!(
            report.health.reasons,
            vec!["critical attribute(s) are above zero".to_string()]
        );
    }

    #[test]
    fn test_dry_run_does_not_touch_the_ledger() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        let raw = raw_output("TST-4", (200, 200, 51), 0, 0, 0);
        process_device_output(&store, "TST-4", "/dev/sdd", &raw, at(9), false).unwrap();

        assert!(!dir.path().join("TST-4").exists());
        assert!(store.last_snapshot("TST-4").unwrap().is_none());
    }

    #[test]
    fn test_regression_reads_ledger_as_of_run_start() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        let run1 = raw_output("TST-5", (200, 200, 51), 5, 0, 0);
        process_device_output(&store, "TST-5", "/dev/sde", &run1, at(9), true).unwrap();

        // the comparison must see run1's row, not run2's own append
        let run2 = raw_output("TST-5", (200, 200, 51), 7, 0, 0);
        let r2 = process_device_output(&store, "TST-5", "/dev/sde", &run2, at(10), true).unwrap();
        assert_eq!(
            r2.regressions,
            vec!["ReallocatedSectorCount increased from 5 to 7".to_string()]
        );

        let after = store.last_snapshot("TST-5").unwrap().unwrap();
        assert_eq!(after.reallocated, Some(7));
    }
}
