// Flags critical metrics that worsened since the last recorded snapshot

use crate::models::{CriticalMetric, CriticalSnapshot};

/// Compares a new snapshot against the previously recorded one and
/// returns one finding per metric that strictly increased, in fixed
/// metric order.
///
/// A device's first-ever run has no previous snapshot and produces no
/// findings; the same holds per metric when either side is unknown.
pub fn detect_regressions(
    previous: Option<&CriticalSnapshot>,
    current: &CriticalSnapshot,
) -> Vec<String> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for metric in CriticalMetric::ALL {
        if let (Some(before), Some(now)) = (previous.value(metric), current.value(metric)) {
            if now > before {
                findings.push(format!(
                    "{} increased from {} to {}",
                    metric.column_name(),
                    before,
                    now
                ));
            }
        }
    }

    findings
}
