use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use permit_map::config::{Config, TimestampFormat};
use permit_map::logging;
use permit_map::pipeline;

#[derive(Parser)]
#[command(name = "permit_map")]
#[command(about = "Film permit aggregation pipeline for ZIP-code maps")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the processing pipeline once
    Process {
        /// Path to a TOML config file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Permit CSV path (overrides the config file)
        #[arg(long)]
        permits: Option<PathBuf>,
        /// Boundary GeoJSON path (overrides the config file)
        #[arg(long)]
        boundaries: Option<PathBuf>,
        /// Output directory (overrides the config file)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Timestamp layout of the permit export
        #[arg(long, value_enum)]
        timestamp_format: Option<TimestampFormat>,
        /// Include the weighted_permits secondary metric in the outputs
        #[arg(long)]
        weighted: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            config,
            permits,
            boundaries,
            output_dir,
            timestamp_format,
            weighted,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            if let Some(permits) = permits {
                config.permits_path = permits;
            }
            if let Some(boundaries) = boundaries {
                config.boundaries_path = boundaries;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if let Some(timestamp_format) = timestamp_format {
                config.timestamp_format = timestamp_format;
            }
            if weighted {
                config.include_weighted = true;
            }

            println!("🔄 Processing film permits...");
            match pipeline::run(&config).await {
                Ok(outcome) => {
                    let report = &outcome.report;
                    println!("\n📊 Pipeline Results:");
                    println!("   Rows read: {}", report.rows_read);
                    println!("   Records retained: {}", report.records);
                    println!(
                        "   Dropped (invalid dates): {}",
                        report.dropped_invalid_dates
                    );
                    println!("   Dropped (no postal codes): {}", report.dropped_empty_zips);
                    println!(
                        "   Assignments: {} ({} discarded as non-5-digit)",
                        report.assignments, report.assignments_discarded
                    );
                    println!("   Boundary features written: {}", report.features_written);
                    println!(
                        "   Aggregated ZIPs without geometry: {}",
                        report.zips_without_geometry
                    );
                    println!("   Output files:");
                    for path in &outcome.outputs {
                        println!("   - {}", path.display());
                    }
                    println!("\n✅ Processing complete!");
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Processing failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
