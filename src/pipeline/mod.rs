//! The record-expansion-and-aggregation pipeline.
//!
//! Data flows strictly normalize -> expand -> aggregate -> join -> assemble.
//! The two input reads are independent until the join and run concurrently;
//! everything after them is a single-pass batch transform.

pub mod aggregate;
pub mod assemble;
pub mod expand;
pub mod join;
pub mod normalize;

use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::Config;
use crate::domain::{RunReport, RunSummary};
use crate::error::{PipelineError, Result};
use crate::ingest;

/// Result of a complete pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: RunReport,
    pub summary: RunSummary,
    /// Published artifact paths, in write order.
    pub outputs: Vec<PathBuf>,
}

/// Runs the pipeline once: read both inputs, transform, publish all
/// artifacts or none.
///
/// # Errors
///
/// Fatal conditions only: a missing input file (checked before any
/// processing), an unparseable input artifact, or a failed write. Per-row
/// problems are counted in the returned [`RunReport`] instead.
#[instrument(skip(config))]
pub async fn run(config: &Config) -> Result<PipelineOutcome> {
    for path in [&config.permits_path, &config.boundaries_path] {
        if !path.exists() {
            return Err(PipelineError::MissingInput(path.clone()));
        }
    }

    info!("Loading permit and boundary artifacts");
    let permits_path = config.permits_path.clone();
    let boundaries_path = config.boundaries_path.clone();
    let (rows, boundaries) = tokio::try_join!(
        tokio::task::spawn_blocking(move || ingest::permits::read_permits(&permits_path)),
        tokio::task::spawn_blocking(move || ingest::boundaries::read_boundaries(&boundaries_path)),
    )?;
    let rows = rows?;
    let boundaries = boundaries?;
    info!(
        rows = rows.len(),
        features = boundaries.features.len(),
        "Inputs loaded"
    );

    let normalized = normalize::normalize(&rows, config.timestamp_format);
    info!(
        records = normalized.records.len(),
        dropped_invalid_dates = normalized.dropped_invalid_dates,
        dropped_empty_zips = normalized.dropped_empty_zips,
        "Normalized permit rows"
    );

    let expanded = expand::expand(&normalized.records);
    info!(
        assignments = expanded.assignments.len(),
        discarded = expanded.discarded,
        "Expanded multi-zip permits"
    );

    let tables = aggregate::aggregate(&expanded.assignments, config.include_weighted);

    let joined = join::join_geometry(
        boundaries,
        &tables.total_by_zip,
        tables.weighted_by_zip.as_ref(),
        &config.zip_property,
    );
    info!(
        features = joined.collection.features.len(),
        unmatched_zips = joined.zips_without_geometry,
        "Joined totals onto boundary geometry"
    );

    let summary = assemble::run_summary(&normalized.records, &expanded.assignments);

    let report = RunReport {
        rows_read: rows.len(),
        dropped_invalid_dates: normalized.dropped_invalid_dates,
        dropped_empty_zips: normalized.dropped_empty_zips,
        records: normalized.records.len(),
        assignments: expanded.assignments.len(),
        assignments_discarded: expanded.discarded,
        features_written: joined.collection.features.len(),
        features_without_permits: joined.features_without_permits,
        zips_without_geometry: joined.zips_without_geometry,
    };

    let outputs = assemble::write_outputs(
        &config.output_dir,
        joined.collection,
        &tables.weekly,
        &tables.total_by_type,
        &summary,
    )?;

    Ok(PipelineOutcome {
        report,
        summary,
        outputs,
    })
}
