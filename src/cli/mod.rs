//! Command-line interface for the consistency check.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processors::check;
use crate::visualization::PngHistogramPlotter;
use crate::ConsistencyConfig;

const USAGE_NOTE: &str = "\nUSAGE: After `make test` or `test_view_offset_root` has been run,\n\
run `lor-consistency` from the `pretest_output` directory or input that directory as an argument.\n";

#[derive(Parser)]
#[command(name = "lor-consistency")]
#[command(about = "View offset consistency check for closest-voxel LOR dumps", version)]
pub struct Cli {
    /// Directory containing the LOR position dumps (defaults to the current directory)
    directory: Option<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// l2-norm tolerance above which an event counts as failed
    #[arg(long)]
    tolerance: Option<f64>,

    /// Fraction of failed events allowed before a source is flagged
    #[arg(long)]
    allowed_fraction: Option<f64>,

    /// Write one distance histogram PNG per point source into this directory
    #[arg(long)]
    histogram_dir: Option<PathBuf>,

    /// Use a logarithmic count axis for histograms
    #[arg(long)]
    log_y: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut ConsistencyConfig) {
        if let Some(tolerance) = self.tolerance {
            config.evaluation.tolerance = tolerance;
        }
        if let Some(fraction) = self.allowed_fraction {
            config.evaluation.allowed_failure_fraction = fraction;
        }
        if self.log_y {
            config.histogram.log_y = true;
        }
    }
}

/// Create a progress bar for per-source work
fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let mut config = match &cli.config {
        Some(path) => match ConsistencyConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                ConsistencyConfig::default()
            }
        },
        None => ConsistencyConfig::default(),
    };
    cli.apply_overrides(&mut config);

    println!("{}", USAGE_NOTE);

    let directory = match &cli.directory {
        Some(dir) => dir.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Cannot determine working directory: {}", e);
                std::process::exit(1);
            }
        },
    };

    cmd_check(&directory, cli.histogram_dir.as_deref(), &config);
}

fn cmd_check(directory: &Path, histogram_dir: Option<&Path>, config: &ConsistencyConfig) {
    let start = Instant::now();
    info!("Working directory: {}", directory.display());
    info!(
        "Tolerance: {}, allowed failure fraction: {}",
        config.evaluation.tolerance, config.evaluation.allowed_failure_fraction
    );

    let stdout = std::io::stdout();
    let registry = match check::run_check(&mut stdout.lock(), directory, config) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Consistency check failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Some(output_dir) = histogram_dir {
        let mut plotter = PngHistogramPlotter::from_config(output_dir, &config.histogram);
        let progress = create_progress_bar(registry.len() as u64);

        match check::plot_histograms(&registry, &mut plotter, config, &progress) {
            Ok(plotted) => {
                progress.finish_and_clear();

                print_summary(
                    "Distance Histograms Complete",
                    &[
                        ("Output directory", output_dir.display().to_string()),
                        ("Histograms", plotted.to_string()),
                        ("Bins", config.histogram.bins.to_string()),
                        ("Log y", config.histogram.log_y.to_string()),
                        ("Duration", format!("{:.2?}", start.elapsed())),
                    ],
                );
            }
            Err(e) => {
                progress.finish_and_clear();
                error!("Histogram plotting failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    println!("Done");
}
