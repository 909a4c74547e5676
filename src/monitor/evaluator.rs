// Threshold and critical-metric rules producing the per-run verdict

use crate::models::{AttributeRow, CriticalMetric, CriticalSnapshot, HealthReport, Verdict};

/// Computes the health verdict for one device from its attribute table
/// and critical-metric snapshot.
///
/// Rules run in fixed order and Bad is terminal:
/// a worst-value dip below threshold anywhere in the table means Warn,
/// a current value at or below threshold means Bad, and any known
/// critical metric above zero means Bad. Each rule reports once, at the
/// first offending row. An empty table skips the two table scans.
pub fn evaluate(table: &[AttributeRow], snapshot: &CriticalSnapshot) -> HealthReport {
    let mut verdict = Verdict::Good;
    let mut reasons = Vec::new();

    if table.iter().any(|row| row.worst <= row.threshold) {
        verdict = Verdict::Warn;
        reasons.push("attribute(s) have previously dipped below threshold".to_string());
    }

    if table.iter().any(|row| row.current <= row.threshold) {
        verdict = Verdict::Bad;
        reasons.push("attribute(s) are currently below threshold".to_string());
    }

    let any_critical_above_zero = CriticalMetric::ALL
        .iter()
        .any(|&metric| snapshot.value(metric).is_some_and(|v| v > 0));
    if any_critical_above_zero {
        verdict = Verdict::Bad;
        reasons.push("critical attribute(s) are above zero".to_string());
    }

    HealthReport { verdict, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn row(current: u32, worst: u32, threshold: u32) -> AttributeRow {
        AttributeRow {
            id: "5".to_string(),
            name: "Reallocated_Sector_Ct".to_string(),
            current,
            worst,
            threshold,
        }
    }

    fn clean_snapshot() -> CriticalSnapshot {
        CriticalSnapshot {
            taken_at: noon(),
            reallocated: Some(0),
            pending: Some(0),
            uncorrectable: Some(0),
        }
    }

    #[test]
    fn test_healthy_table_is_good_with_no_reasons() {
        let table = vec![row(200, 200, 140), row(100, 95, 0)];
        let report = evaluate(&table, &clean_snapshot());
        assert_eq!(report.verdict, Verdict::Good);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn test_worst_dip_is_warn() {
        let table = vec![row(200, 140, 140)];
        let report = evaluate(&table, &clean_snapshot());
        assert_eq!(report.verdict, Verdict::Warn);
        assert_eq!(
            report.reasons,
            vec!["attribute(s) have previously dipped below threshold".to_string()]
        );
    }

    #[test]
    fn test_current_below_threshold_is_bad() {
        let table = vec![row(120, 120, 140)];
        let report = evaluate(&table, &clean_snapshot());
        assert_eq!(report.verdict, Verdict::Bad);
        assert!(
            report
                .reasons
                .contains(&"attribute(s) are currently below threshold".to_string())
        );
    }

    #[test]
    fn test_bad_dominates_warn() {
        // one row trips the worst scan, another trips the current scan
        let table = vec![row(200, 130, 140), row(100, 200, 140)];
        let report = evaluate(&table, &clean_snapshot());
        assert_eq!(report.verdict, Verdict::Bad);
        assert_eq!(report.reasons.len(), 2);
    }

    #[test]
    fn test_warn_reason_reported_once_for_many_rows() {
        let table = vec![row(200, 100, 140), row(200, 90, 140), row(200, 80, 140)];
        let report = evaluate(&table, &clean_snapshot());
        assert_eq!(
            report
                .reasons
                .iter()
                .filter(|r| r.contains("previously dipped"))
                .count(),
            1
        );
    }

    #[test]
    fn test_critical_metric_above_zero_is_bad() {
        let mut snapshot = clean_snapshot();
        snapshot.pending = Some(1);
        let report = evaluate(&[row(200, 200, 140)], &snapshot);
        assert_eq!(report.verdict, Verdict::Bad);
        assert_eq!(
            report.reasons,
            vec!["critical attribute(s) are above zero".to_string()]
        );
    }

    #[test]
    fn test_unknown_critical_metric_skips_comparison() {
        let snapshot = CriticalSnapshot::empty(noon());
        let report = evaluate(&[row(200, 200, 140)], &snapshot);
        assert_eq!(report.verdict, Verdict::Good);
    }

    #[test]
    fn test_empty_table_depends_only_on_critical_metrics() {
        let report = evaluate(&[], &clean_snapshot());
        assert_eq!(report.verdict, Verdict::Good);

        let mut snapshot = clean_snapshot();
        snapshot.uncorrectable = Some(4);
        let report = evaluate(&[], &snapshot);
        assert_eq!(report.verdict, Verdict::Bad);
    }
}
