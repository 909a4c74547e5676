// Assembles per-device report blocks and the run summary text

use chrono::NaiveDateTime;

use crate::history::LEDGER_TIME_FORMAT;
use crate::models::DeviceReport;

/// Renders one device's report block: identity and verdict header,
/// reasons, regression findings, partition overview, blank separator.
pub fn render_device(report: &DeviceReport) -> String {
    let mut out = String::new();

    let model = report.model.as_deref().unwrap_or("unknown model");
    out.push_str(&format!(
        "{} ({}, {}): {}\n",
        report.serial,
        report.path,
        model,
        report.health.verdict.label()
    ));

    for reason in &report.health.reasons {
        out.push_str(&format!("  - {}\n", reason));
    }
    for finding in &report.regressions {
        out.push_str(&format!("  - {}\n", finding));
    }
    for part in &report.partitions {
        out.push_str(&format!(
            "  {} ({}): {:.1}/{:.1} GB used ({:.0}%)\n",
            part.mount_point, part.fs_type, part.used_gb, part.total_gb, part.used_percent
        ));
    }

    out.push('\n');
    out
}

/// Concatenates all device blocks under a timestamped run header and
/// appends the run tally.
pub fn render_run_summary(
    started_at: NaiveDateTime,
    reports: &[DeviceReport],
    skipped: usize,
    failures: usize,
) -> String {
    let mut out = format!(
        "Drive health summary - {}\n\n",
        started_at.format(LEDGER_TIME_FORMAT)
    );

    for report in reports {
        out.push_str(&render_device(report));
    }

    out.push_str(&format!(
        "{} device(s) evaluated, {} skipped, {} failed\n",
        reports.len(),
        skipped,
        failures
    ));
    out
}
