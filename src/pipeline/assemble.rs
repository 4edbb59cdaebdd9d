use chrono::{Datelike, NaiveDate};
use geojson::FeatureCollection;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{
    ExpandedAssignment, PeriodSummary, PermitRecord, RunSummary, TotalByType, WeeklyTypeCount,
};
use crate::error::{PipelineError, Result};

/// Output file name for the annotated boundary geometry.
pub const GEOMETRY_FILE: &str = "zip_permits.geojson";

/// Output file name for the weekly aggregate table.
pub const WEEKLY_FILE: &str = "weekly_permits.json";

/// Output file name for the per-type aggregate table.
pub const TYPE_FILE: &str = "total_by_type.json";

/// Output file name for the run summary.
pub const SUMMARY_FILE: &str = "monthly_stats.json";

/// Builds the run summary: one entry per observed (year, month) bucket plus
/// an all-time range over the retained records.
///
/// Derived data, recomputed from scratch each run. With zero retained
/// records the monthly list is empty and the aggregate entry is `None`.
pub fn run_summary(records: &[PermitRecord], assignments: &[ExpandedAssignment]) -> RunSummary {
    let months: BTreeSet<&str> = assignments.iter().map(|a| a.month.as_str()).collect();

    let monthly = months
        .into_iter()
        .filter_map(month_bounds)
        .map(|(start, end)| PeriodSummary {
            start,
            end,
            label: start.format("%b %Y").to_string(),
        })
        .collect();

    let start = records.iter().map(|r| r.start).min();
    let end = records.iter().map(|r| r.start).max();
    let aggregate = match (start, end) {
        (Some(start), Some(end)) => Some(PeriodSummary {
            start: start.date(),
            end: end.date(),
            label: "All Time".to_string(),
        }),
        _ => None,
    };

    RunSummary { monthly, aggregate }
}

/// Resolves a `%Y-%m` label to the first and last day of that month.
fn month_bounds(label: &str) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d").ok()?;
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// Serializes and publishes the four output artifacts.
///
/// Every artifact is staged to a `.tmp` sibling first; renames happen only
/// after all writes succeeded, so a failed run publishes nothing and the
/// prior run's artifacts stay intact.
///
/// # Errors
///
/// Returns [`PipelineError::Write`] naming the offending path when staging
/// or publishing fails.
pub fn write_outputs(
    output_dir: &Path,
    collection: FeatureCollection,
    weekly: &[WeeklyTypeCount],
    total_by_type: &[TotalByType],
    summary: &RunSummary,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::Write {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let artifacts = [
        (GEOMETRY_FILE, serde_json::to_string_pretty(&collection)?),
        (WEEKLY_FILE, serde_json::to_string_pretty(weekly)?),
        (TYPE_FILE, serde_json::to_string_pretty(total_by_type)?),
        (SUMMARY_FILE, serde_json::to_string_pretty(summary)?),
    ];

    let mut staged = Vec::with_capacity(artifacts.len());
    for (name, contents) in &artifacts {
        let tmp = output_dir.join(format!("{name}.tmp"));
        fs::write(&tmp, contents).map_err(|e| PipelineError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        staged.push((tmp, output_dir.join(name)));
    }

    let mut published = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        fs::rename(&tmp, &path).map_err(|e| PipelineError::Write {
            path: path.clone(),
            source: e,
        })?;
        info!("Wrote {}", path.display());
        published.push(path);
    }

    Ok(published)
}
