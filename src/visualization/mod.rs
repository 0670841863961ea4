//! Distance histograms for visual inspection of the consistency check.
//!
//! The statistical core never depends on this module. Rendering goes through
//! the [`DistancePlotter`] trait; [`PngHistogramPlotter`] draws PNG files
//! with plotters.

use std::path::{Path, PathBuf};

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::HistogramConfig;
use crate::core::metrics::{mean, median, round_sig};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("No distances to plot")]
    EmptyData,

    #[error("Invalid bin count: {0}")]
    InvalidBinCount(usize),
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Histogram rendering options.
#[derive(Debug, Clone)]
pub struct HistogramOptions {
    pub bins: usize,
    pub log_y: bool,
    /// Prefix for the title, e.g. `"Point 3:"`.
    pub title_prefix: String,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            bins: 100,
            log_y: false,
            title_prefix: String::new(),
        }
    }
}

impl HistogramOptions {
    pub fn from_config(config: &HistogramConfig, title_prefix: impl Into<String>) -> Self {
        Self {
            bins: config.bins,
            log_y: config.log_y,
            title_prefix: title_prefix.into(),
        }
    }
}

/// Equal-width binning of a distance sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceHistogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub mean: f64,
    pub median: f64,
}

impl DistanceHistogram {
    /// Bin `distances` into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// Every bin is half-open except the last, which also holds `max`. When
    /// all values are equal the range is widened to `[v - 0.5, v + 0.5]`.
    pub fn from_distances(distances: &[f64], bins: usize) -> Result<Self> {
        if distances.is_empty() {
            return Err(VisualizationError::EmptyData);
        }
        if bins == 0 {
            return Err(VisualizationError::InvalidBinCount(bins));
        }

        let (mut lo, mut hi) = distances
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| (lo.min(d), hi.max(d)));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &d in distances {
            let idx = (((d - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self {
            edges,
            counts,
            mean: mean(distances),
            median: median(distances),
        })
    }

    /// Largest bin count.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Title used for distance histograms.
pub fn histogram_title(prefix: &str, mean: f64, median: f64) -> String {
    format!(
        "{} l2-norm of distance to origin: Mean = {} and Median = {}",
        prefix,
        round_sig(mean, 2),
        round_sig(median, 2)
    )
}

/// Legend for the marker lines drawn by [`render_histogram_png`].
pub const HISTOGRAM_LEGEND: &str = "Mean: red, Median: green";

/// Title and legend of one histogram as a single line.
///
/// The PNG carries only bars and marker lines, so this line is what
/// [`PngHistogramPlotter`] logs next to each written file.
pub fn histogram_caption(prefix: &str, histogram: &DistanceHistogram) -> String {
    format!(
        "{} ({})",
        histogram_title(prefix, histogram.mean, histogram.median),
        HISTOGRAM_LEGEND
    )
}

/// Sink for distance histograms.
pub trait DistancePlotter {
    /// Render the histogram of `distances` under `name`.
    fn plot_distance_histogram(&mut self, name: &str, distances: &[f64], options: &HistogramOptions) -> Result<()>;
}

/// Writes each histogram to `<output_dir>/<name>.png`.
#[derive(Debug, Clone)]
pub struct PngHistogramPlotter {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    written: Vec<PathBuf>,
    captions: Vec<String>,
}

impl PngHistogramPlotter {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            width,
            height,
            written: Vec::new(),
            captions: Vec::new(),
        }
    }

    pub fn from_config(output_dir: impl Into<PathBuf>, config: &HistogramConfig) -> Self {
        Self::new(output_dir, config.width, config.height)
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Title and legend of every file written so far, in the same order.
    pub fn captions(&self) -> &[String] {
        &self.captions
    }
}

impl DistancePlotter for PngHistogramPlotter {
    fn plot_distance_histogram(&mut self, name: &str, distances: &[f64], options: &HistogramOptions) -> Result<()> {
        let histogram = DistanceHistogram::from_distances(distances, options.bins)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format!("{}.png", name));
        render_histogram_png(&output_path, &histogram, options, (self.width, self.height))?;

        let caption = histogram_caption(&options.title_prefix, &histogram);
        log::info!("{} -> {}", caption, output_path.display());
        self.written.push(output_path);
        self.captions.push(caption);
        Ok(())
    }
}

/// Render a binned histogram with mean (red) and median (green) markers.
///
/// The bitmap backend is built without font support, so the title and
/// legend are not drawn into the image; [`PngHistogramPlotter`] logs them.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `histogram` - Binned distances
/// * `options` - Log scale and title prefix
/// * `size` - Image size in pixels
pub fn render_histogram_png(
    output_path: &Path,
    histogram: &DistanceHistogram,
    options: &HistogramOptions,
    size: (u32, u32),
) -> Result<()> {
    let x_range = histogram.edges[0]..histogram.edges[histogram.edges.len() - 1];
    let y_top = (histogram.max_count().max(1) as f64) * 1.05;

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    if options.log_y {
        // Counts below one have no bar on a log axis.
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(x_range, (0.5f64..y_top.max(1.0)).log_scale())
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        draw_histogram(&mut chart, histogram, 0.5, y_top)?;
    } else {
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(x_range, 0f64..y_top)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        draw_histogram(&mut chart, histogram, 0.0, y_top)?;
    }

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Draw the bars and the mean/median markers.
fn draw_histogram<Y>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, Y>>,
    histogram: &DistanceHistogram,
    baseline: f64,
    y_top: f64,
) -> Result<()>
where
    Y: Ranged<ValueType = f64>,
{
    let bars = histogram
        .counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(i, &count)| {
            Rectangle::new(
                [(histogram.edges[i], baseline), (histogram.edges[i + 1], count as f64)],
                BAR_COLOR.filled(),
            )
        });
    chart
        .draw_series(bars)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    for (x, color) in [(histogram.mean, RED), (histogram.median, GREEN)] {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x, baseline), (x, y_top)],
                color.stroke_width(2),
            )))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    Ok(())
}
