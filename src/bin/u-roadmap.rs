//! `u-roadmap` command-line entry point.
//!
//! Loads configuration and JSON inputs, runs the pipeline, and prints the
//! combined output as pretty JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use u_roadmap::config::RoadmapConfig;
use u_roadmap::models::Quarter;
use u_roadmap::pipeline::{load_metrics, load_projects, Pipeline};

/// Prioritize, schedule and track a project portfolio.
#[derive(Parser, Debug)]
#[command(name = "u-roadmap", version, about, long_about = None)]
struct Cli {
    /// JSON array of project records
    #[arg(long)]
    projects: PathBuf,

    /// JSON metrics snapshot
    #[arg(long)]
    metrics: PathBuf,

    /// TOML configuration (default: $U_ROADMAP_CONFIG or ./u-roadmap.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Current quarter, overriding the configuration
    #[arg(long)]
    quarter: Option<Quarter>,

    /// Skip repository activity (tier 3)
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &cli.config {
        Some(path) => RoadmapConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RoadmapConfig::load().context("loading config")?,
    };
    let projects = load_projects(&cli.projects).context("loading projects")?;
    let metrics = load_metrics(&cli.metrics).context("loading metrics")?;

    let mut pipeline = if cli.offline {
        Pipeline::new(config)
    } else {
        Pipeline::from_environment(config)
    };
    if let Some(quarter) = cli.quarter {
        pipeline = pipeline.with_current_quarter(quarter);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let output = runtime.block_on(pipeline.run(&projects, &metrics));

    let json = serde_json::to_string_pretty(&output).context("encoding output")?;
    println!("{json}");
    Ok(())
}
