//! Configuration types for the consistency check.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where the point-source dumps live and how they are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File name prefix, followed by the point-source id
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// File name suffix appended after the point-source id
    #[serde(default = "default_filename_suffix")]
    pub filename_suffix: String,

    /// First point-source id (inclusive)
    #[serde(default = "default_first_id")]
    pub first_id: u32,

    /// Last point-source id (inclusive)
    #[serde(default = "default_last_id")]
    pub last_id: u32,
}

fn default_filename_prefix() -> String {
    "root_header_test".to_string()
}

fn default_filename_suffix() -> String {
    "_lor_pos.txt".to_string()
}

fn default_first_id() -> u32 {
    1
}

fn default_last_id() -> u32 {
    11
}

impl InputConfig {
    /// File name of the dump for point source `id`.
    pub fn file_name(&self, id: u32) -> String {
        format!("{}{}{}", self.filename_prefix, id, self.filename_suffix)
    }

    /// Full path of the dump for point source `id` inside `directory`.
    pub fn file_path(&self, directory: &Path, id: u32) -> PathBuf {
        directory.join(self.file_name(id))
    }

    /// Point-source ids in load order.
    pub fn ids(&self) -> std::ops::RangeInclusive<u32> {
        self.first_id..=self.last_id
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_filename_prefix(),
            filename_suffix: default_filename_suffix(),
            first_id: default_first_id(),
            last_id: default_last_id(),
        }
    }
}

/// Pass/fail classification parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// l2-norm distance above which an event counts as failed
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Fraction of failed events a source may have before it is flagged
    #[serde(default = "default_allowed_failure_fraction")]
    pub allowed_failure_fraction: f64,
}

/// Tolerance carried over from earlier view offset studies.
pub const DEFAULT_TOLERANCE: f64 = 6.66983;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_allowed_failure_fraction() -> f64 {
    0.5
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            allowed_failure_fraction: default_allowed_failure_fraction(),
        }
    }
}

/// Console report formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Significant figures for failure percentages
    #[serde(default = "default_percentage_sig_figs")]
    pub percentage_sig_figs: i32,

    /// Significant figures for mean axis offsets
    #[serde(default = "default_bias_sig_figs")]
    pub bias_sig_figs: i32,
}

fn default_percentage_sig_figs() -> i32 {
    3
}

fn default_bias_sig_figs() -> i32 {
    2
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            percentage_sig_figs: default_percentage_sig_figs(),
            bias_sig_figs: default_bias_sig_figs(),
        }
    }
}

/// Distance histogram rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Number of equal-width bins
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// Use a logarithmic count axis
    #[serde(default)]
    pub log_y: bool,

    /// Image width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_bins() -> usize {
    100
}

fn default_width() -> u32 {
    1500
}

fn default_height() -> u32 {
    500
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            log_y: false,
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Top-level configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub histogram: HistogramConfig,
}

impl ConsistencyConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConsistencyConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = ConsistencyConfig::default();
        assert_eq!(config.evaluation.tolerance, 6.66983);
        assert_eq!(config.evaluation.allowed_failure_fraction, 0.5);
        assert_eq!(config.report.percentage_sig_figs, 3);
        assert_eq!(config.report.bias_sig_figs, 2);
        assert_eq!(config.histogram.bins, 100);
        assert!(!config.histogram.log_y);
    }

    #[test]
    fn test_default_input_file_names() {
        let input = InputConfig::default();
        assert_eq!(input.file_name(1), "root_header_test1_lor_pos.txt");
        assert_eq!(input.file_name(11), "root_header_test11_lor_pos.txt");
        assert_eq!(input.ids().count(), 11);
        assert_eq!(
            input.file_path(Path::new("pretest_output"), 3),
            Path::new("pretest_output").join("root_header_test3_lor_pos.txt")
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "evaluation:").unwrap();
        writeln!(file, "  tolerance: 4.0").unwrap();
        writeln!(file, "input:").unwrap();
        writeln!(file, "  last_id: 3").unwrap();
        file.flush().unwrap();

        let config = ConsistencyConfig::from_yaml(file.path())?;
        assert_eq!(config.evaluation.tolerance, 4.0);
        assert_eq!(config.evaluation.allowed_failure_fraction, 0.5);
        assert_eq!(config.input.first_id, 1);
        assert_eq!(config.input.last_id, 3);
        assert_eq!(config.input.filename_prefix, "root_header_test");
        Ok(())
    }

    #[test]
    fn test_yaml_save_and_reload() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("consistency.yaml");

        let mut config = ConsistencyConfig::default();
        config.histogram.log_y = true;
        config.to_yaml(&path)?;

        let reloaded = ConsistencyConfig::from_yaml(&path)?;
        assert!(reloaded.histogram.log_y);
        assert_eq!(reloaded.input.filename_suffix, "_lor_pos.txt");
        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConsistencyConfig::from_yaml("/nonexistent/consistency.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
