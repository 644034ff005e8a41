//! Analytics Tool - Difficulty and behavior report for a gameplay dataset
//!
//! Loads episode folders and frame images, computes level and action metrics,
//! categorizes level difficulty and prints a text report.
//!
//! Usage:
//!   cargo run --bin analyze -- data/smb
//!   cargo run --bin analyze -- data/smb --output results/metrics.json
//!   cargo run --bin analyze -- data/smb --dump-dataset results/dataset.json
//!   cargo run --bin analyze -- --from-dump results/dataset.json

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gameplay_metrics::dataset::count_frame_files;
use gameplay_metrics::settings::SETTINGS_FILE;
use gameplay_metrics::{AnalysisSettings, LoadedDataset, analyze, load};

#[derive(Debug, Parser)]
#[command(name = "analyze", about = "Analyze level difficulty from recorded gameplay")]
struct Args {
    /// Dataset root containing one folder per episode
    root: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write all tables as JSON to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Worker threads for frame parsing (overrides settings, 0 = auto)
    #[arg(long)]
    threads: Option<usize>,

    /// Save the loaded raw tables as JSON
    #[arg(long)]
    dump_dataset: Option<PathBuf>,

    /// Analyze a previously dumped dataset instead of a dataset root
    #[arg(long, conflicts_with = "root")]
    from_dump: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_settings(args: &Args) -> Result<AnalysisSettings> {
    let mut settings = match &args.config {
        Some(path) => AnalysisSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => AnalysisSettings::load_or_default(Path::new(SETTINGS_FILE)),
    };
    if let Some(threads) = args.threads {
        settings.loader.threads = threads;
    }
    Ok(settings)
}

fn format_elapsed(secs: u64) -> String {
    let (minutes, seconds) = (secs / 60, secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let settings = load_settings(&args)?;
    let started = Instant::now();

    let dataset = match (&args.from_dump, &args.root) {
        (Some(dump), _) => LoadedDataset::read_json(dump)
            .with_context(|| format!("reading dataset dump {}", dump.display()))?,
        (None, Some(root)) => {
            let total = count_frame_files(root)?;
            println!("Loading {} ({} frame files)...", root.display(), total);
            load(root, &settings)?
        }
        (None, None) => bail!("either a dataset root or --from-dump is required"),
    };

    if let Some(path) = &args.dump_dataset {
        dataset.write_json(path)?;
        println!("Dataset written to {}", path.display());
    }

    let output = analyze(&dataset, &settings)?;
    println!("{}", output.format_report());

    if let Some(path) = &args.output {
        output.write_json(path)?;
        println!("\nTables written to {}", path.display());
    }

    println!(
        "\nAnalysis finished in {}",
        format_elapsed(started.elapsed().as_secs())
    );
    Ok(())
}
