use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::TimestampFormat;
use crate::domain::PermitRecord;
use crate::ingest::permits::RawPermitRow;

/// Result of normalizing one batch of raw rows.
pub struct NormalizeOutcome {
    pub records: Vec<PermitRecord>,
    /// Rows dropped because StartDateTime or EndDateTime failed to parse.
    pub dropped_invalid_dates: usize,
    /// Rows dropped because no usable postal-code piece remained.
    pub dropped_empty_zips: usize,
}

/// Parses timestamps and splits the postal-code field of each raw row.
///
/// Both timestamps must parse with the configured strict layout; the
/// postal-code field is split on commas, each piece trimmed, empty pieces
/// dropped, duplicates within one row collapsed to the first occurrence.
/// Rows failing either rule are dropped and counted, never an error.
pub fn normalize(rows: &[RawPermitRow], format: TimestampFormat) -> NormalizeOutcome {
    let layout = format.as_chrono_format();
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped_invalid_dates = 0;
    let mut dropped_empty_zips = 0;

    for row in rows {
        let start = NaiveDateTime::parse_from_str(&row.start, layout);
        let end = NaiveDateTime::parse_from_str(&row.end, layout);
        let (start, end) = match (start, end) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                debug!(id = %row.id, "Dropping row with invalid timestamps");
                dropped_invalid_dates += 1;
                continue;
            }
        };

        let postal_codes = split_postal_codes(&row.postal_codes);
        if postal_codes.is_empty() {
            debug!(id = %row.id, "Dropping row with no postal codes");
            dropped_empty_zips += 1;
            continue;
        }

        records.push(PermitRecord {
            id: row.id.clone(),
            event_type: row.event_type.clone(),
            start,
            end,
            postal_codes,
        });
    }

    NormalizeOutcome {
        records,
        dropped_invalid_dates,
        dropped_empty_zips,
    }
}

/// Splits a raw postal-code field into distinct trimmed pieces,
/// preserving first-seen order.
fn split_postal_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for piece in raw.split(',') {
        let piece = piece.trim();
        if piece.is_empty() || codes.iter().any(|c| c == piece) {
            continue;
        }
        codes.push(piece.to_string());
    }
    codes
}
