//! Closest-voxel information for a single point source.

use std::path::{Path, PathBuf};

use crate::core::loaders::{self, Axis, Point3D};
use crate::core::metrics::ErrorMetrics;

/// One point-source dump with its cached error metrics.
///
/// The tolerance is the only mutable state: [`failed_event_count`] with an
/// override stores the new value for every later call.
///
/// [`failed_event_count`]: PointSourceRecord::failed_event_count
#[derive(Debug, Clone)]
pub struct PointSourceRecord {
    /// Original coordinate of the point source.
    pub original_coord: Point3D,
    /// Closest voxel to the original for each LOR.
    pub coord_list: Vec<Point3D>,
    /// Errors of `coord_list` against `original_coord`.
    pub metrics: ErrorMetrics,
    tolerance: f64,
    source_path: Option<PathBuf>,
}

impl PointSourceRecord {
    /// Build a record from already parsed coordinates.
    pub fn from_coords(original_coord: Point3D, coord_list: Vec<Point3D>, tolerance: f64) -> Self {
        let metrics = ErrorMetrics::compute(&original_coord, &coord_list);
        Self {
            original_coord,
            coord_list,
            metrics,
            tolerance,
            source_path: None,
        }
    }

    /// Load a record from a dump written by the view offset test.
    pub fn from_file<P: AsRef<Path>>(path: P, tolerance: f64) -> loaders::Result<Self> {
        let path = path.as_ref();
        let (original, coords) = loaders::load_lor_positions(path)?;
        let mut record = Self::from_coords(original, coords, tolerance);
        record.source_path = Some(path.to_path_buf());
        Ok(record)
    }

    /// File the record was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Recompute the cached metrics from the stored coordinates.
    pub fn recompute_metrics(&mut self) {
        self.metrics = ErrorMetrics::compute(&self.original_coord, &self.coord_list);
    }

    pub fn err_l2(&self) -> &[f64] {
        &self.metrics.err_l2
    }

    pub fn err_x(&self) -> &[f64] {
        &self.metrics.err_x
    }

    pub fn err_y(&self) -> &[f64] {
        &self.metrics.err_y
    }

    pub fn err_z(&self) -> &[f64] {
        &self.metrics.err_z
    }

    /// Signed offsets along `axis`.
    pub fn axis_offsets(&self, axis: Axis) -> &[f64] {
        self.metrics.offsets(axis)
    }

    /// Number of LOR events in the dump (every line after the original).
    #[inline]
    pub fn event_count(&self) -> usize {
        self.coord_list.len()
    }

    /// Currently stored tolerance.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// Number of events whose l2 error exceeds `tolerance`.
    ///
    /// Does not touch the stored tolerance.
    pub fn count_failed_with(&self, tolerance: f64) -> usize {
        self.metrics.err_l2.iter().filter(|&&err| err > tolerance).count()
    }

    /// Number of events whose l2 error exceeds the stored tolerance.
    ///
    /// An override replaces the stored tolerance before counting and stays
    /// in effect for all later calls. The overwrite is announced on stdout.
    pub fn failed_event_count(&mut self, override_tolerance: Option<f64>) -> usize {
        if let Some(tolerance) = override_tolerance {
            println!("Overwriting tolerance value as {}", tolerance);
            self.tolerance = tolerance;
        }
        self.count_failed_with(self.tolerance)
    }

    /// Failed events as a percentage of all events. Zero when there are no events.
    pub fn failure_percentage(&self) -> f64 {
        let events = self.event_count();
        if events == 0 {
            return 0.0;
        }
        self.count_failed_with(self.tolerance) as f64 / events as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOLERANCE;
    use crate::core::loaders::LoaderError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dump(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_scenario_from_file() -> loaders::Result<()> {
        let file = write_dump(&["0 0 0 ", "1 0 0 ", "0 2 0 ", "10 10 10 "]);
        let mut record = PointSourceRecord::from_file(file.path(), 6.0)?;

        assert_eq!(record.event_count(), 3);
        assert_eq!(record.err_l2()[0], 1.0);
        assert_eq!(record.err_l2()[1], 2.0);
        assert!((record.err_l2()[2] - 17.32).abs() < 0.01);
        assert_eq!(record.failed_event_count(None), 1);
        assert_eq!(record.source_path(), Some(file.path()));

        Ok(())
    }

    #[test]
    fn test_event_count_is_lines_minus_one() -> loaders::Result<()> {
        let file = write_dump(&["1 1 1", "1 1 2", "1 2 1", "2 1 1", "0 0 0", "3 3 3"]);
        let record = PointSourceRecord::from_file(file.path(), DEFAULT_TOLERANCE)?;

        assert_eq!(record.event_count(), 5);
        assert_eq!(record.err_l2().len(), 5);
        assert_eq!(record.err_x().len(), 5);
        assert_eq!(record.err_y().len(), 5);
        assert_eq!(record.err_z().len(), 5);

        Ok(())
    }

    #[test]
    fn test_failed_count_override_persists() {
        let coords = vec![
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(3.0, 0.0, 0.0),
            Point3D::new(5.0, 0.0, 0.0),
            Point3D::new(7.0, 0.0, 0.0),
        ];
        let mut record = PointSourceRecord::from_coords(Point3D::default(), coords, DEFAULT_TOLERANCE);

        assert_eq!(record.failed_event_count(None), 1);
        assert_eq!(record.failed_event_count(Some(2.0)), 3);
        assert_eq!(record.tolerance(), 2.0);
        assert_eq!(record.failed_event_count(None), 3);

        // A later override replaces the earlier one.
        assert_eq!(record.failed_event_count(Some(6.0)), 1);
        assert_eq!(record.tolerance(), 6.0);
    }

    #[test]
    fn test_count_failed_with_does_not_mutate() {
        let coords = vec![Point3D::new(1.0, 0.0, 0.0), Point3D::new(4.0, 0.0, 0.0)];
        let record = PointSourceRecord::from_coords(Point3D::default(), coords, 6.0);

        assert_eq!(record.count_failed_with(0.5), 2);
        assert_eq!(record.count_failed_with(4.0), 0);
        assert_eq!(record.tolerance(), 6.0);
    }

    #[test]
    fn test_tolerance_boundary_is_exclusive() {
        let coords = vec![Point3D::new(6.0, 0.0, 0.0)];
        let record = PointSourceRecord::from_coords(Point3D::default(), coords, 6.0);
        assert_eq!(record.count_failed_with(6.0), 0);
    }

    #[test]
    fn test_failure_percentage() {
        let coords = vec![
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(9.0, 0.0, 0.0),
            Point3D::new(9.0, 0.0, 0.0),
            Point3D::new(0.0, 0.0, 0.0),
        ];
        let record = PointSourceRecord::from_coords(Point3D::default(), coords, 6.0);
        assert_eq!(record.failure_percentage(), 50.0);

        let empty = PointSourceRecord::from_coords(Point3D::default(), Vec::new(), 6.0);
        assert_eq!(empty.failure_percentage(), 0.0);
    }

    #[test]
    fn test_recompute_metrics() {
        let mut record =
            PointSourceRecord::from_coords(Point3D::default(), vec![Point3D::new(1.0, 0.0, 0.0)], 6.0);
        record.coord_list.push(Point3D::new(0.0, 0.0, -2.0));
        assert_eq!(record.metrics.len(), 1);

        record.recompute_metrics();
        assert_eq!(record.err_l2(), &[1.0, 2.0]);
        assert_eq!(record.axis_offsets(Axis::Z), &[0.0, -2.0]);
    }

    #[test]
    fn test_from_missing_file() {
        let result = PointSourceRecord::from_file("/nonexistent/dump.txt", DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(LoaderError::FileNotFound(_))));
    }
}
