//! Error metrics between closest-voxel positions and the original source.
//!
//! Distances are computed once per record and cached in [`ErrorMetrics`].
//! The statistics helpers follow NumPy conventions (`mean` of an empty slice
//! is NaN, `median` averages the two middle values).

use super::loaders::{Axis, Point3D};

/// Per-event errors relative to the original point-source position.
///
/// All four sequences are aligned by index with the closest-voxel list they
/// were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMetrics {
    /// Euclidean distance to the original coordinate.
    pub err_l2: Vec<f64>,
    /// Signed x offset (voxel - original).
    pub err_x: Vec<f64>,
    /// Signed y offset (voxel - original).
    pub err_y: Vec<f64>,
    /// Signed z offset (voxel - original).
    pub err_z: Vec<f64>,
}

impl ErrorMetrics {
    /// Compute all error sequences for `coords` against `original`.
    pub fn compute(original: &Point3D, coords: &[Point3D]) -> Self {
        Self {
            err_l2: distance_to_original(original, coords),
            err_x: axis_offset(original, coords, Axis::X),
            err_y: axis_offset(original, coords, Axis::Y),
            err_z: axis_offset(original, coords, Axis::Z),
        }
    }

    /// Number of events the metrics were computed for.
    #[inline]
    pub fn len(&self) -> usize {
        self.err_l2.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.err_l2.is_empty()
    }

    /// Signed offsets along `axis`.
    pub fn offsets(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.err_x,
            Axis::Y => &self.err_y,
            Axis::Z => &self.err_z,
        }
    }

    /// Mean signed offset along each axis, in x, y, z order.
    pub fn mean_offsets(&self) -> [f64; 3] {
        Axis::ALL.map(|axis| mean(self.offsets(axis)))
    }
}

/// Euclidean distance from each coordinate to `original`.
pub fn distance_to_original(original: &Point3D, coords: &[Point3D]) -> Vec<f64> {
    coords.iter().map(|c| original.distance_to(c)).collect()
}

/// Signed `coord[axis] - original[axis]` for each coordinate.
///
/// Unlike the Euclidean distance this can be negative, which is what makes
/// a systematic shift along one axis visible.
pub fn axis_offset(original: &Point3D, coords: &[Point3D], axis: Axis) -> Vec<f64> {
    let reference = original.axis(axis);
    coords.iter().map(|c| c.axis(axis) - reference).collect()
}

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median. NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Round `x` to `sig` significant figures.
///
/// Rounding happens at decimal position `sig - floor(log10(|x|)) - 1` on the
/// exact binary value of `x`, with ties to even. `1.15` is stored as
/// `1.1499…` and so rounds down to `1.1`. Zero and non-finite values are
/// returned unchanged since `log10` has no usable order of magnitude for them.
///
/// # Example
///
/// ```
/// use lor_consistency::core::metrics::round_sig;
///
/// assert_eq!(round_sig(1234.5, 2), 1200.0);
/// assert_eq!(round_sig(0.001234, 2), 0.0012);
/// assert_eq!(round_sig(0.0, 2), 0.0);
/// ```
pub fn round_sig(x: f64, sig: i32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }

    let magnitude = x.abs().log10().floor() as i32;
    let digits = sig - magnitude - 1;

    if digits >= 0 {
        // Precision formatting rounds the exact value; scaling first would not.
        format!("{:.*}", digits as usize, x).parse().unwrap_or(x)
    } else {
        let scale = 10f64.powi(-digits);
        (x / scale).round_ties_even() * scale
    }
}
