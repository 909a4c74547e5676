// Extracts the fixed critical-metric set from raw diagnostic text

use chrono::NaiveDateTime;

use crate::models::{ATA_RAW_VALUE_FIELDS, CriticalSnapshot, RawValueField};

/// Reads the critical metrics out of one device's raw diagnostic text
/// using the default ATA raw-value field layout.
///
/// This is deliberately independent of the attribute table parser: the
/// table may be empty or shaped differently, but these three metrics are
/// looked up by their own label lines.
pub fn extract_critical_metrics(raw: &str, taken_at: NaiveDateTime) -> CriticalSnapshot {
    extract_with_fields(raw, &ATA_RAW_VALUE_FIELDS, taken_at)
}

/// Same as [`extract_critical_metrics`] but with an explicit field
/// layout, for vendor formats that place the raw value elsewhere.
pub fn extract_with_fields(
    raw: &str,
    fields: &[RawValueField],
    taken_at: NaiveDateTime,
) -> CriticalSnapshot {
    let mut snapshot = CriticalSnapshot::empty(taken_at);

    for field in fields {
        let value = raw
            .lines()
            .find(|line| line.contains(field.label))
            .and_then(|line| line.split_whitespace().nth(field.column - 1))
            .and_then(parse_raw_value);
        snapshot.set_value(field.metric, value);
    }

    snapshot
}

// Raw values are usually plain integers but some vendors print hex.
fn parse_raw_value(token: &str) -> Option<u64> {
    if let Some(hex) = token.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16).ok();
    }
    token.parse().ok()
}
