use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{ExpandedAssignment, PermitRecord};

/// A usable postal code is exactly five ASCII digits.
static ZIP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());

/// Result of expanding one batch of normalized records.
pub struct ExpandOutcome {
    pub assignments: Vec<ExpandedAssignment>,
    /// Assignments discarded for a non-5-digit postal code.
    pub discarded: usize,
}

/// Expands each record into one assignment per postal code.
///
/// Every assignment carries weight 1/N, where N is the number of distinct
/// postal codes on the source record, so weighted metrics attribute one
/// permit across its codes without inflation. Year and week follow ISO-8601
/// week numbering of the start timestamp; the month label is its `%Y-%m`
/// rendering.
///
/// The 5-digit rule is applied per assignment: a bad code discards only its
/// own assignment, the record's other codes are kept. Pure; assignments from
/// one record keep their source-relative order.
pub fn expand(records: &[PermitRecord]) -> ExpandOutcome {
    let mut assignments = Vec::new();
    let mut discarded = 0;

    for record in records {
        let weight = 1.0 / record.postal_codes.len() as f64;
        let iso_week = record.start.iso_week();
        let month = record.start.format("%Y-%m").to_string();

        for code in &record.postal_codes {
            if !ZIP_PATTERN.is_match(code) {
                discarded += 1;
                continue;
            }

            assignments.push(ExpandedAssignment {
                permit_id: record.id.clone(),
                postal_code: code.clone(),
                event_type: record.event_type.clone(),
                weight,
                year: iso_week.year(),
                week: iso_week.week(),
                month: month.clone(),
            });
        }
    }

    ExpandOutcome {
        assignments,
        discarded,
    }
}
