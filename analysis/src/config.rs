//! Survey configuration.
//!
//! Defines the YAML-serializable settings that control batching,
//! parallelism, headline distributions and report thresholds. Every section
//! falls back to its defaults when omitted.
//!
//! # Example YAML
//!
//! ```yaml
//! analysis:
//!   batch_size: 100
//!   parallelism: 8
//!   progress_interval: 500
//!   indexed_array_limit: 10
//!   headline_fields:
//!     - key: movementType
//!       label: Movement Type
//!     - key: status
//!       label: Status
//! report:
//!   sample_display_limit: 10
//!   lookup_table_max_values: 30
//!   high_null_threshold: 95.0
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_survey_core::MAX_SAMPLE_VALUES;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Documents processed per batch; batches run one after another.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Files between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;
/// Array elements that also get a positional `[i]` path.
pub const DEFAULT_INDEXED_ARRAY_LIMIT: usize = 10;

/// Name fragments that mark a field as categorical.
pub const DEFAULT_LOOKUP_NAME_FRAGMENTS: &[&str] = &[
    "type", "name", "status", "role", "group", "code", "flag", "banner", "brand",
];

/// Reference tables that receive a default `Unknown` row.
pub const DEFAULT_SEED_TABLES: &[&str] = &[
    "movement_types",
    "statuses",
    "roles",
    "groups",
    "codes",
    "flags",
    "banners",
    "brands",
];

/// A top-level string field whose value distribution gets its own section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineField {
    /// Property name on the document root.
    pub key: String,
    /// Heading used in the report.
    pub label: String,
}

impl HeadlineField {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Settings for directory traversal and the worker pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Files per sequential batch.
    pub batch_size: usize,
    /// Worker threads per batch (`None` = twice the available CPUs).
    pub parallelism: Option<usize>,
    /// Files between progress notifications.
    pub progress_interval: usize,
    /// Array elements tracked under positional paths.
    pub indexed_array_limit: usize,
    /// Fields whose value distribution is tallied separately.
    pub headline_fields: Vec<HeadlineField>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallelism: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            indexed_array_limit: DEFAULT_INDEXED_ARRAY_LIMIT,
            headline_fields: vec![
                HeadlineField::new("movementType", "Movement Type"),
                HeadlineField::new("status", "Status"),
            ],
        }
    }
}

impl AnalyzerConfig {
    /// Worker count to use, resolving the adaptive default.
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(default_parallelism)
    }
}

/// Twice the available hardware concurrency.
pub fn default_parallelism() -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count * 2
}

/// Thresholds and limits applied while synthesizing the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Sample values printed per field.
    pub sample_display_limit: usize,
    /// Upper bound on distinct samples for lookup eligibility.
    pub max_lookup_samples: usize,
    /// Upper bound on distinct samples for the lookup-table list.
    pub lookup_table_max_values: usize,
    /// Null/empty percentage above which a field is flagged.
    pub high_null_threshold: f64,
    /// Flagged fields printed.
    pub high_null_display_limit: usize,
    /// Processing errors printed verbatim.
    pub error_preview_limit: usize,
    /// Categorical name fragments, matched case-insensitively.
    pub lookup_name_fragments: Vec<String>,
    /// Tables receiving a default-row insert.
    pub seed_tables: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sample_display_limit: 10,
            max_lookup_samples: MAX_SAMPLE_VALUES,
            lookup_table_max_values: 30,
            high_null_threshold: 95.0,
            high_null_display_limit: 20,
            error_preview_limit: 20,
            lookup_name_fragments: DEFAULT_LOOKUP_NAME_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seed_tables: DEFAULT_SEED_TABLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Top-level survey configuration.
///
/// # Examples
///
/// ```
/// use schema_survey_analysis::SurveyConfig;
///
/// let config: SurveyConfig = serde_yaml::from_str("analysis:\n  batch_size: 25\n").unwrap();
/// assert_eq!(config.analysis.batch_size, 25);
/// assert_eq!(config.analysis.progress_interval, 500);
/// assert_eq!(config.report.lookup_table_max_values, 30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub analysis: AnalyzerConfig,
    pub report: ReportConfig,
}

impl SurveyConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](AnalysisError::Io) if the file cannot be read,
    /// [`Yaml`](AnalysisError::Yaml) if parsing fails, or
    /// [`InvalidConfig`](AnalysisError::InvalidConfig) if a value is out of
    /// range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Rejects values that would stall or misreport a run.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.batch_size == 0 {
            return Err(invalid("analysis.batch_size must be at least 1"));
        }
        if analysis.progress_interval == 0 {
            return Err(invalid("analysis.progress_interval must be at least 1"));
        }
        if analysis.parallelism == Some(0) {
            return Err(invalid("analysis.parallelism must be at least 1"));
        }
        if analysis.headline_fields.iter().any(|f| f.key.trim().is_empty()) {
            return Err(invalid("analysis.headline_fields entries need a key"));
        }

        let report = &self.report;
        if !(0.0..=100.0).contains(&report.high_null_threshold) {
            return Err(invalid("report.high_null_threshold must be between 0 and 100"));
        }
        if report.lookup_name_fragments.is_empty() {
            return Err(invalid("report.lookup_name_fragments cannot be empty"));
        }
        if report.max_lookup_samples > MAX_SAMPLE_VALUES {
            return Err(AnalysisError::InvalidConfig(format!(
                "report.max_lookup_samples cannot exceed {MAX_SAMPLE_VALUES}"
            )));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> AnalysisError {
    AnalysisError::InvalidConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
analysis:
  batch_size: 50
  parallelism: 3
  progress_interval: 200
  indexed_array_limit: 5
  headline_fields:
    - key: kind
      label: Kind
report:
  sample_display_limit: 5
  high_null_threshold: 90.0
  lookup_name_fragments: [category]
  seed_tables: [categories]
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: SurveyConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.analysis.batch_size, 50);
        assert_eq!(config.analysis.effective_parallelism(), 3);
        assert_eq!(config.analysis.indexed_array_limit, 5);
        assert_eq!(config.analysis.headline_fields, vec![HeadlineField::new("kind", "Kind")]);
        assert_eq!(config.report.sample_display_limit, 5);
        assert_eq!(config.report.high_null_threshold, 90.0);
        assert_eq!(config.report.seed_tables, vec!["categories"]);
        // Unspecified values keep their defaults.
        assert_eq!(config.report.error_preview_limit, 20);
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: SurveyConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SurveyConfig::default());
        assert_eq!(config.analysis.headline_fields.len(), 2);
        assert_eq!(config.analysis.headline_fields[0].key, "movementType");
    }

    #[test]
    fn test_default_parallelism_is_twice_cpu_count() {
        let cpus = std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4);
        assert_eq!(AnalyzerConfig::default().effective_parallelism(), cpus * 2);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = SurveyConfig::default();
        config.analysis.batch_size = 0;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = SurveyConfig::default();
        config.report.high_null_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.yml");

        let original: SurveyConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = SurveyConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.yml");
        std::fs::write(&path, "analysis:\n  progress_interval: 0\n").unwrap();
        assert!(matches!(
            SurveyConfig::load(&path),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }
}
