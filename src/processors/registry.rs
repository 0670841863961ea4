//! Ordered collection of point-source records keyed by source id.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use super::point_source::PointSourceRecord;
use crate::config::InputConfig;

/// Point-source records keyed by id, iterated in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct PointSourceRegistry {
    records: BTreeMap<u32, PointSourceRecord>,
}

impl PointSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for `id`.
    pub fn insert(&mut self, id: u32, record: PointSourceRecord) -> Option<PointSourceRecord> {
        self.records.insert(id, record)
    }

    pub fn get(&self, id: u32) -> Option<&PointSourceRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut PointSourceRecord> {
        self.records.get_mut(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.keys().copied()
    }

    /// `(id, record)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PointSourceRecord)> {
        self.records.iter().map(|(&id, record)| (id, record))
    }

    /// Load every configured point-source dump from `directory`.
    ///
    /// Files are loaded in id order and a progress line is printed for each.
    /// The first file that fails to load aborts the whole batch.
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory holding the dumps (usually `pretest_output`)
    /// * `input` - File naming and id range
    /// * `tolerance` - Tolerance assigned to every record
    pub fn load_from_directory(directory: &Path, input: &InputConfig, tolerance: f64) -> Result<Self> {
        let mut registry = Self::new();

        for id in input.ids() {
            let path = input.file_path(directory, id);
            println!("Loading data: {}", path.display());

            let record = PointSourceRecord::from_file(&path, tolerance)
                .with_context(|| format!("Failed to load point source {} from {}", id, path.display()))?;
            log::debug!("point source {}: {} events", id, record.event_count());

            registry.insert(id, record);
        }

        Ok(registry)
    }
}

impl FromIterator<(u32, PointSourceRecord)> for PointSourceRegistry {
    fn from_iter<I: IntoIterator<Item = (u32, PointSourceRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::Point3D;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_dump(dir: &Path, input: &InputConfig, id: u32, events: usize) {
        let mut file = File::create(input.file_path(dir, id)).unwrap();
        writeln!(file, "{} 0 0 ", id).unwrap();
        for i in 0..events {
            writeln!(file, "{} {} 0 ", id, i).unwrap();
        }
    }

    #[test]
    fn test_load_from_directory() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let input = InputConfig {
            last_id: 3,
            ..InputConfig::default()
        };
        for id in input.ids() {
            create_dump(temp_dir.path(), &input, id, id as usize + 1);
        }

        let registry = PointSourceRegistry::load_from_directory(temp_dir.path(), &input, 6.0)?;
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(registry.get(3).map(|r| r.event_count()), Some(4));
        assert_eq!(registry.get(2).map(|r| r.tolerance()), Some(6.0));

        Ok(())
    }

    #[test]
    fn test_load_aborts_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = InputConfig {
            last_id: 3,
            ..InputConfig::default()
        };
        create_dump(temp_dir.path(), &input, 1, 2);
        create_dump(temp_dir.path(), &input, 3, 2);

        let err = PointSourceRegistry::load_from_directory(temp_dir.path(), &input, 6.0).unwrap_err();
        assert!(err.to_string().contains("point source 2"));
    }

    #[test]
    fn test_iteration_follows_id_order() {
        let record = |x: f64| {
            PointSourceRecord::from_coords(Point3D::default(), vec![Point3D::new(x, 0.0, 0.0)], 6.0)
        };
        let mut registry: PointSourceRegistry =
            vec![(7, record(7.0)), (2, record(2.0)), (11, record(11.0))].into_iter().collect();
        registry.insert(1, record(1.0));

        let ids: Vec<u32> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 7, 11]);

        if let Some(rec) = registry.get_mut(7) {
            rec.set_tolerance(1.0);
        }
        assert_eq!(registry.get(7).map(|r| r.count_failed_with(r.tolerance())), Some(1));
    }
}
