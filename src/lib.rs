//! View offset consistency check for closest-voxel LOR dumps.
//!
//! This crate provides tools for:
//! - Loading the `root_header_test{N}_lor_pos.txt` dumps written by the
//!   view offset test (original source position plus closest voxel per LOR)
//! - Computing l2 and signed per-axis errors against the original position
//! - Reporting failed-event rates and per-axis biases for all point sources
//! - Optionally plotting distance histograms
//!
//! # Example
//!
//! ```no_run
//! use lor_consistency::processors::PointSourceRecord;
//!
//! let mut record = PointSourceRecord::from_file("root_header_test1_lor_pos.txt", 6.66983).unwrap();
//! println!("{} of {} events failed", record.failed_event_count(None), record.event_count());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::ConsistencyConfig;
pub use crate::core::loaders::Point3D;
pub use processors::{PointSourceRecord, PointSourceRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
