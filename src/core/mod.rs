//! Core data types, the dump loader and error metrics.

pub mod loaders;
pub mod metrics;

pub use loaders::{load_lor_positions, Axis, LoaderError, Point3D};
pub use metrics::{axis_offset, distance_to_original, mean, median, round_sig, ErrorMetrics};
