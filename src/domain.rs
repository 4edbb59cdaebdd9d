use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A permit row that survived normalization.
///
/// Exists only when both timestamps parsed and at least one postal-code
/// piece remained after splitting; rows failing either rule are dropped and
/// tallied before this type is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PermitRecord {
    /// Source identifier, unique within one input file.
    pub id: String,
    /// Event category, e.g. "Shooting Permit".
    pub event_type: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Distinct postal codes in first-seen order, whitespace-trimmed.
    pub postal_codes: Vec<String>,
}

/// One (permit, postal code) pairing produced by the expander.
///
/// Never persisted; consumed only by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedAssignment {
    pub permit_id: String,
    pub postal_code: String,
    pub event_type: String,
    /// 1 / number of postal codes on the source record.
    pub weight: f64,
    /// ISO-8601 week-year of the permit start.
    pub year: i32,
    /// ISO-8601 week number of the permit start.
    pub week: u32,
    /// Year-month label of the permit start, e.g. "2023-01".
    pub month: String,
}

/// Weekly aggregate row: (year, week, postal code, event type) -> count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTypeCount {
    pub year: i32,
    pub week: u32,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub permit_count: u64,
}

/// Per-type aggregate row: (postal code, event type) -> count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalByType {
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub type_count: u64,
}

/// One labeled date range in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Observed time range of a run: one entry per (year, month) bucket with
/// assignments, plus an all-time entry. Recomputed wholesale each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub monthly: Vec<PeriodSummary>,
    /// `None` when no permit record survived normalization.
    pub aggregate: Option<PeriodSummary>,
}

/// Per-run diagnostics. Recoverable per-row issues are counted here,
/// never itemized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Raw rows read from the permit CSV.
    pub rows_read: usize,
    /// Rows dropped because a timestamp failed to parse.
    pub dropped_invalid_dates: usize,
    /// Rows dropped because no postal-code piece remained after splitting.
    pub dropped_empty_zips: usize,
    /// Records that survived normalization.
    pub records: usize,
    /// Assignments produced by expansion.
    pub assignments: usize,
    /// Assignments discarded for a non-5-digit postal code.
    pub assignments_discarded: usize,
    /// Boundary features written to the geometry artifact.
    pub features_written: usize,
    /// Boundary features with no matching permits (total filled with 0).
    pub features_without_permits: usize,
    /// Aggregated postal codes with no boundary geometry.
    pub zips_without_geometry: usize,
}
