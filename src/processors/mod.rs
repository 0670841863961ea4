//! Point-source processing: records, the registry, reports and the check itself.

pub mod check;
pub mod point_source;
pub mod registry;
pub mod report;

// Re-export key types for convenience
pub use check::{plot_histograms, run_check};
pub use point_source::PointSourceRecord;
pub use registry::PointSourceRegistry;
pub use report::{
    axis_bias_summary, pass_fail_rows, print_axis_biases, print_pass_and_fail, write_axis_biases,
    write_pass_and_fail, AxisBiasRow, AxisBiasSummary, PassFailRow, HIGH_VALUE_WARNING,
};
