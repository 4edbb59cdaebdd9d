use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required input file is missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to write output artifact {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON parsing failed: {0}")]
    Geojson(#[from] geojson::Error),

    #[error("Boundary file {} does not contain a GeoJSON FeatureCollection", .0.display())]
    InvalidBoundaries(PathBuf),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
