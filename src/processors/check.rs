//! The view offset consistency check: load every dump, report, optionally plot.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use super::registry::PointSourceRegistry;
use super::report::{write_axis_biases, write_pass_and_fail};
use crate::config::ConsistencyConfig;
use crate::visualization::{DistancePlotter, HistogramOptions};

/// Load all configured point sources from `directory` and write both report
/// tables to `out`.
///
/// # Errors
///
/// Fails on the first dump that cannot be loaded, or if `out` cannot be
/// written. Nothing is reported in that case.
pub fn run_check<W: Write>(out: &mut W, directory: &Path, config: &ConsistencyConfig) -> Result<PointSourceRegistry> {
    let registry =
        PointSourceRegistry::load_from_directory(directory, &config.input, config.evaluation.tolerance)?;

    write_pass_and_fail(out, &registry, config.evaluation.allowed_failure_fraction, &config.report)
        .context("Failed to write pass/fail table")?;
    write_axis_biases(out, &registry, &config.report).context("Failed to write axis bias table")?;

    Ok(registry)
}

/// Hand the l2 distances of every point source to `plotter`.
///
/// Sources without events are skipped. Returns the number of histograms
/// produced.
pub fn plot_histograms<P: DistancePlotter + ?Sized>(
    registry: &PointSourceRegistry,
    plotter: &mut P,
    config: &ConsistencyConfig,
    progress: &ProgressBar,
) -> Result<usize> {
    let mut plotted = 0;

    for (id, record) in registry.iter() {
        progress.set_message(format!("point source {}", id));

        if record.event_count() == 0 {
            log::warn!("point source {} has no events, skipping histogram", id);
        } else {
            let options = HistogramOptions::from_config(&config.histogram, format!("Point {}:", id));
            plotter
                .plot_distance_histogram(&format!("point_{}_distance_histogram", id), record.err_l2(), &options)
                .with_context(|| format!("Failed to plot histogram for point source {}", id))?;
            plotted += 1;
        }

        progress.inc(1);
    }

    Ok(plotted)
}
