// Parses the vendor attribute table out of raw diagnostic text

use crate::models::AttributeRow;

/// Stable token smartmontools prints in the attribute-section header.
const TABLE_MARKER: &str = "ID# ATTRIBUTE_NAME";

/// Builds the attribute table from one device's raw diagnostic text.
///
/// Rows are collected from the line after the section header until the
/// first blank line or end of input, in input order. Lines that do not
/// carry six whitespace-delimited fields with numeric VALUE/WORST/THRESH
/// columns are skipped; device-model variance is expected. A missing
/// marker yields an empty table, not an error.
pub fn parse_attribute_table(raw: &str) -> Vec<AttributeRow> {
    let mut rows = Vec::new();
    let mut lines = raw.lines();

    if !lines.by_ref().any(|line| line.contains(TABLE_MARKER)) {
        return rows;
    }

    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        if let Some(row) = parse_row(line) {
            rows.push(row);
        }
    }

    rows
}

fn parse_row(line: &str) -> Option<AttributeRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }

    Some(AttributeRow {
        id: tokens[0].to_string(),
        name: tokens[1].to_string(),
        current: tokens[3].parse().ok()?,
        worst: tokens[4].parse().ok()?,
        threshold: tokens[5].parse().ok()?,
    })
}
