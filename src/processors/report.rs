//! Console summaries of the view offset consistency check.
//!
//! Each table is computed into plain rows first so the numbers can be
//! checked without parsing text, then rendered to any [`Write`] sink.

use std::io::{self, Write};

use super::registry::PointSourceRegistry;
use crate::config::ReportConfig;
use crate::core::metrics::round_sig;

/// Marker appended to sources with too many failed events.
pub const HIGH_VALUE_WARNING: &str = "HIGH VALUE WARNING!";

/// Pass/fail numbers for one point source.
#[derive(Debug, Clone, PartialEq)]
pub struct PassFailRow {
    pub id: u32,
    pub num_events: usize,
    pub num_failed_events: usize,
    /// Failed events as a percentage of all events.
    pub percentage: f64,
    /// Set when `percentage` is strictly above the allowed percentage.
    pub warning: bool,
}

/// Mean axis offsets for one point source.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBiasRow {
    pub id: u32,
    /// Mean signed offset in x, y, z order.
    pub mean_offset: [f64; 3],
}

/// Per-source mean offsets and their overall mean.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBiasSummary {
    pub rows: Vec<AxisBiasRow>,
    /// Mean of the per-source means, one value per axis.
    ///
    /// Every source carries the same weight regardless of how many events it
    /// has. NaN when there are no sources.
    pub total_bias: [f64; 3],
}

/// Compute the pass/fail row for every source, in id order.
///
/// Failed events are counted against each record's stored tolerance without
/// modifying it.
pub fn pass_fail_rows(registry: &PointSourceRegistry, allowed_fraction: f64) -> Vec<PassFailRow> {
    let allowed_percentage = allowed_fraction * 100.0;

    registry
        .iter()
        .map(|(id, record)| {
            let percentage = record.failure_percentage();
            PassFailRow {
                id,
                num_events: record.event_count(),
                num_failed_events: record.count_failed_with(record.tolerance()),
                percentage,
                warning: percentage > allowed_percentage,
            }
        })
        .collect()
}

/// Compute the mean axis offsets for every source and the total bias.
pub fn axis_bias_summary(registry: &PointSourceRegistry) -> AxisBiasSummary {
    let rows: Vec<AxisBiasRow> = registry
        .iter()
        .map(|(id, record)| AxisBiasRow {
            id,
            mean_offset: record.metrics.mean_offsets(),
        })
        .collect();

    let total_bias = if rows.is_empty() {
        [f64::NAN; 3]
    } else {
        let mut sums = [0.0f64; 3];
        for row in &rows {
            for (sum, value) in sums.iter_mut().zip(row.mean_offset) {
                *sum += value;
            }
        }
        sums.map(|sum| sum / rows.len() as f64)
    };

    AxisBiasSummary { rows, total_bias }
}

/// Format a report value the way the harness output has always looked:
/// whole numbers keep one decimal (`1200.0`), NaN prints as `nan`, and
/// magnitudes below `1e-4` or from `1e16` up use exponent notation with a
/// signed two-digit exponent (`1.2e-05`, `1e+16`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format_exponent(value);
    }

    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Rewrite Rust's `1.2e-5` as `1.2e-05`.
fn format_exponent(value: f64) -> String {
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// Write the pass/fail table.
pub fn write_pass_and_fail<W: Write>(
    out: &mut W,
    registry: &PointSourceRegistry,
    allowed_fraction: f64,
    report: &ReportConfig,
) -> io::Result<()> {
    writeln!(out, "\n\nInformation regarding pass fail rate of the view offset test")?;
    writeln!(
        out,
        " ID || The Number of Events  ||  The Number of Failed Events  ||  Percentage Error"
    )?;
    writeln!(out, "{}", "-".repeat(83))?;

    for row in pass_fail_rows(registry, allowed_fraction) {
        let warning_msg = if row.warning { HIGH_VALUE_WARNING } else { "" };
        writeln!(
            out,
            "{}  ||           {}         ||              {}                ||      {}      {}",
            row.id,
            row.num_events,
            row.num_failed_events,
            format_value(round_sig(row.percentage, report.percentage_sig_figs)),
            warning_msg
        )?;
    }

    Ok(())
}

/// Write the per-source mean offsets followed by the total bias.
pub fn write_axis_biases<W: Write>(
    out: &mut W,
    registry: &PointSourceRegistry,
    report: &ReportConfig,
) -> io::Result<()> {
    let summary = axis_bias_summary(registry);
    let fmt = |v: f64| format_value(round_sig(v, report.bias_sig_figs));

    writeln!(out, "\nMean offset in each axis for each source position")?;
    writeln!(out, " ID ||   x   ||   y   ||   z")?;
    writeln!(out, "{}", "-".repeat(24))?;

    for row in &summary.rows {
        let [x, y, z] = row.mean_offset;
        writeln!(out, "{}  || {}  || {}  || {}  ", row.id, fmt(x), fmt(y), fmt(z))?;
    }

    let [x, y, z] = summary.total_bias;
    writeln!(out, "\nTOTAL BIAS")?;
    writeln!(out, "   ||   x    ||   y    ||   z")?;
    writeln!(out, "   || {}   || {}   || {}", fmt(x), fmt(y), fmt(z))?;

    Ok(())
}

/// Print the pass/fail table to stdout.
pub fn print_pass_and_fail(
    registry: &PointSourceRegistry,
    allowed_fraction: f64,
    report: &ReportConfig,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_pass_and_fail(&mut out, registry, allowed_fraction, report)
}

/// Print the axis bias tables to stdout.
pub fn print_axis_biases(registry: &PointSourceRegistry, report: &ReportConfig) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_axis_biases(&mut out, registry, report)
}
