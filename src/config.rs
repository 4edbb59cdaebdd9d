use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Timestamp layout of the permit export.
///
/// The upstream export has shipped two incompatible layouts at different
/// times, so the layout is configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// `2023-01-02 10:00:00`
    Iso,
    /// `01/02/2023 10:00:00 AM`
    Us,
}

impl TimestampFormat {
    pub fn as_chrono_format(self) -> &'static str {
        match self {
            Self::Iso => "%Y-%m-%d %H:%M:%S",
            Self::Us => "%m/%d/%Y %I:%M:%S %p",
        }
    }
}

/// Pipeline configuration, loaded from a TOML file and overridable per-flag.
///
/// Every run gets an explicit `Config`; nothing is read from process-wide
/// state once the pipeline starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the permit CSV.
    pub permits_path: PathBuf,
    /// Path to the boundary GeoJSON.
    pub boundaries_path: PathBuf,
    /// Directory the output artifacts are published into.
    pub output_dir: PathBuf,
    /// Feature property carrying the postal code on boundary features.
    pub zip_property: String,
    /// Layout of the StartDateTime / EndDateTime columns.
    pub timestamp_format: TimestampFormat,
    /// Emit the weighted_permits secondary metric alongside the raw counts.
    pub include_weighted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            permits_path: PathBuf::from("data/raw/film_permits.csv"),
            boundaries_path: PathBuf::from("data/raw/zip_boundaries.geojson"),
            output_dir: PathBuf::from("data/processed"),
            zip_property: "postalCode".to_string(),
            timestamp_format: TimestampFormat::Iso,
            include_weighted: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            permits_path = "input/permits.csv"
            timestamp_format = "us"
            "#,
        )
        .unwrap();

        assert_eq!(config.permits_path, PathBuf::from("input/permits.csv"));
        assert_eq!(config.timestamp_format, TimestampFormat::Us);
        assert_eq!(config.zip_property, "postalCode");
        assert!(!config.include_weighted);
    }

    #[test]
    fn format_strings_match_both_export_layouts() {
        let iso = chrono::NaiveDateTime::parse_from_str(
            "2023-01-02 10:00:00",
            TimestampFormat::Iso.as_chrono_format(),
        );
        let us = chrono::NaiveDateTime::parse_from_str(
            "01/02/2023 10:00:00 AM",
            TimestampFormat::Us.as_chrono_format(),
        );

        assert_eq!(iso.unwrap(), us.unwrap());
    }
}
