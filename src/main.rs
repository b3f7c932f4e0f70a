//! Disaster Timeline
//!
//! CLI commands:
//! - render: Render the disaster-cost timeline to an SVG file
//! - inspect: Summarize a dataset without rendering

mod annotate;
mod axis;
mod config;
mod glyph;
mod logging;
mod records;
mod scales;
mod scene;
mod svg;
mod timeline;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "disaster_timeline")]
#[command(about = "Timeline visualization of natural-disaster costs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to timeline.yaml config
    #[arg(short, long, default_value = "timeline.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the timeline to an SVG file
    Render {
        /// Input CSV dataset
        #[arg(short, long, default_value = "data/disaster_costs.csv")]
        data: PathBuf,

        /// Output SVG path
        #[arg(short, long, default_value = "timeline.svg")]
        out: PathBuf,
    },

    /// Summarize a dataset without rendering
    Inspect {
        /// Input CSV dataset
        #[arg(short, long, default_value = "data/disaster_costs.csv")]
        data: PathBuf,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first
    let _guard = logging::init_logging("logs");
    tracing::info!("Disaster Timeline starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    // Load config
    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::TimelineConfig::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        config::TimelineConfig::default()
    };
    tracing::info!(
        "Config loaded: {}x{} canvas, {} scheme entries",
        config.container_width,
        config.container_height,
        config.coloring_scheme.len()
    );

    match cli.command {
        Commands::Render { data, out } => {
            render_chart(&config, &data, &out).await?;
        }

        Commands::Inspect { data, json } => {
            inspect_dataset(&data, json).await?;
        }
    }

    Ok(())
}

/// Load the dataset, run one render pass and write the SVG.
async fn render_chart(
    config: &config::TimelineConfig,
    data: &Path,
    out: &Path,
) -> anyhow::Result<()> {
    // The single suspension point: waiting for the dataset. Everything after
    // this runs synchronously to completion.
    let text = tokio::fs::read_to_string(data)
        .await
        .with_context(|| format!("reading dataset {:?}", data))?;
    let mut records = records::parse_records(&text)?;
    tracing::info!("Loaded {} records from {:?}", records.len(), data);

    let mut chart = timeline::Timeline::new(config, &records)?;
    chart.render(&mut records);

    std::fs::write(out, chart.to_svg()).with_context(|| format!("writing {:?}", out))?;
    println!("Rendered {} records -> {:?}", records.len(), out);
    Ok(())
}

/// Print a per-year summary of the dataset.
async fn inspect_dataset(data: &Path, json: bool) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(data)
        .await
        .with_context(|| format!("reading dataset {:?}", data))?;
    let mut records = records::parse_records(&text)?;
    annotate::mark_costliest(&mut records);

    let mut by_year: BTreeMap<i32, Vec<&records::DisasterRecord>> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in &records {
        match record.year {
            Some(year) => by_year.entry(year).or_default().push(record),
            None => skipped += 1,
        }
    }

    if json {
        let years: Vec<serde_json::Value> = by_year
            .iter()
            .map(|(year, group)| {
                serde_json::json!({
                    "year": year,
                    "events": group.len(),
                    "total_cost": group.iter().filter_map(|r| r.cost).sum::<f64>(),
                    "costliest": group
                        .iter()
                        .filter(|r| r.is_costliest)
                        .map(|r| r.name.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let summary = serde_json::json!({
            "records": records.len(),
            "skipped": skipped,
            "years": years,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Dataset: {} records, {} without a usable year",
        records.len(),
        skipped
    );
    println!();
    for (year, group) in &by_year {
        let total: f64 = group.iter().filter_map(|r| r.cost).sum();
        let costliest: Vec<&str> = group
            .iter()
            .filter(|r| r.is_costliest)
            .map(|r| r.display_name.as_str())
            .collect();
        let costliest = if costliest.is_empty() {
            "n/a".to_string()
        } else {
            costliest.join(", ")
        };
        println!(
            "  {} - {} events, ${:.1}B total, costliest: {}",
            year,
            group.len(),
            total / 1e9,
            costliest
        );
    }
    Ok(())
}
