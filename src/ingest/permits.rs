use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// A permit row exactly as it appears in the source CSV.
///
/// Timestamps and the postal-code list stay as raw strings here; parsing and
/// validation happen in the normalizer, which tallies what it drops.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPermitRow {
    #[serde(rename = "EventID")]
    pub id: String,
    #[serde(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "StartDateTime")]
    pub start: String,
    #[serde(rename = "EndDateTime")]
    pub end: String,
    #[serde(rename = "ZipCode(s)")]
    pub postal_codes: String,
}

/// Reads the permit CSV into raw rows.
///
/// # Errors
///
/// Returns [`PipelineError::MissingInput`] when the file does not exist and
/// [`PipelineError::Csv`] when the table itself is structurally invalid.
pub fn read_permits(path: &Path) -> Result<Vec<RawPermitRow>> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let file = File::open(path)?;
    parse_permits(file)
}

fn parse_permits<R: Read>(input: R) -> Result<Vec<RawPermitRow>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_quoted_zip_lists() {
        let data = "\
EventID,EventType,StartDateTime,EndDateTime,ZipCode(s)
42,Shooting Permit,2023-01-02 10:00:00,2023-01-02 12:00:00,\"10001, 10002\"
43,Theater Load in and Load Outs,2023-01-03 08:00:00,2023-01-03 20:00:00,10003
";
        let rows = parse_permits(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "42");
        assert_eq!(rows[0].postal_codes, "10001, 10002");
        assert_eq!(rows[1].event_type, "Theater Load in and Load Outs");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_permits(Path::new("no/such/permits.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }

    #[test]
    fn ragged_rows_are_a_table_level_error() {
        let data = "\
EventID,EventType,StartDateTime,EndDateTime,ZipCode(s)
42,Shooting Permit,2023-01-02 10:00:00
";
        assert!(parse_permits(data.as_bytes()).is_err());
    }
}
