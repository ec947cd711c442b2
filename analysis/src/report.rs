//! Report synthesis from a finished tracker snapshot.
//!
//! [`ReportSynthesizer::synthesize`] turns a [`TrackerSnapshot`] into an
//! [`AnalysisReport`]: distributions, per-field statistics grouped by
//! top-level property, lookup-table candidates, high-null-rate warnings,
//! an error preview and default-row seed statements. Synthesis never
//! fails; missing data yields empty sections.

use std::collections::BTreeMap;

use chrono::Utc;
use regex::Regex;
use rust_decimal::Decimal;
use schema_survey_core::{FieldObserver, ValueKind, leaf_name, top_level_group};
use serde::{Deserialize, Serialize};

use crate::config::{HeadlineField, ReportConfig, SurveyConfig};
use crate::error::{FileError, Result};
use crate::output::render_text;
use crate::tracker::TrackerSnapshot;

/// One value of a headline field and how many documents carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub value: String,
    pub count: usize,
    /// Share of all processed documents, not of documents with the field.
    pub percent: f64,
}

/// Value distribution of one headline field, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSection {
    pub field: String,
    pub label: String,
    pub entries: Vec<DistributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Sample values shown for a lookup-eligible field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDisplay {
    pub values: Vec<String>,
    /// Distinct samples held back by the display limit.
    pub additional: usize,
}

/// Statistics of one field path as printed in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub path: String,
    pub occurrences: usize,
    /// Occurrences relative to processed documents.
    pub occurrence_percent: f64,
    pub types: Vec<ValueKind>,
    pub null_or_empty: usize,
    /// Null/empty relative to this field's own occurrences.
    pub null_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_range: Option<NumericRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleDisplay>,
}

/// Fields sharing a top-level property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub name: String,
    pub fields: Vec<FieldSummary>,
}

/// A string field small and categorical enough for its own reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCandidate {
    pub path: String,
    pub distinct_values: usize,
}

/// A field that is almost always null or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighNullField {
    pub path: String,
    pub null_percent: f64,
    pub null_or_empty: usize,
    pub occurrences: usize,
}

/// Immutable result of one survey run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub total_files: usize,
    pub distributions: Vec<DistributionSection>,
    pub field_groups: Vec<FieldGroup>,
    pub lookup_candidates: Vec<LookupCandidate>,
    pub high_null_threshold: f64,
    /// Highest-rate fields only; see `high_null_total`.
    pub high_null_fields: Vec<HighNullField>,
    pub high_null_total: usize,
    /// Leading processing errors; see `errors_omitted`.
    pub errors: Vec<String>,
    pub errors_total: usize,
    pub errors_omitted: usize,
    pub default_value_sql: Vec<String>,
}

/// Builds [`AnalysisReport`]s from tracker snapshots.
///
/// # Examples
///
/// ```
/// use schema_survey_analysis::{ReportSynthesizer, SchemaTracker, SurveyConfig};
///
/// let tracker = SchemaTracker::default();
/// tracker.add_file();
/// tracker.track("root", &serde_json::json!({ "status": "Approved" }));
///
/// let synthesizer = ReportSynthesizer::from_config(&SurveyConfig::default()).unwrap();
/// let report = synthesizer.synthesize(&tracker.into_snapshot(), &[]);
/// assert_eq!(report.lookup_candidates[0].path, "root.status");
/// ```
#[derive(Debug, Clone)]
pub struct ReportSynthesizer {
    config: ReportConfig,
    headline_fields: Vec<HeadlineField>,
    lookup_name: Regex,
}

impl ReportSynthesizer {
    /// Compiles the lookup-name heuristic from the configured fragments.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLookupPattern`](crate::AnalysisError::InvalidLookupPattern)
    /// if the combined pattern cannot be compiled.
    pub fn new(config: ReportConfig, headline_fields: Vec<HeadlineField>) -> Result<Self> {
        let fragments: Vec<String> = config
            .lookup_name_fragments
            .iter()
            .map(|fragment| regex::escape(fragment.trim()))
            .filter(|fragment| !fragment.is_empty())
            .collect();
        let lookup_name = Regex::new(&format!("(?i)(?:{})s?$", fragments.join("|")))?;

        Ok(Self {
            config,
            headline_fields,
            lookup_name,
        })
    }

    pub fn from_config(config: &SurveyConfig) -> Result<Self> {
        Self::new(config.report.clone(), config.analysis.headline_fields.clone())
    }

    /// True when `field` holds only strings, is named like a category and
    /// has a bounded, non-empty set of distinct values.
    pub fn is_lookup_candidate(&self, path: &str, field: &FieldObserver) -> bool {
        let distinct = field.distinct_sample_count();
        field.is_string_only()
            && self.lookup_name.is_match(leaf_name(path))
            && (1..=self.config.max_lookup_samples).contains(&distinct)
    }

    /// Synthesizes and renders the text report in one step.
    pub fn render(&self, snapshot: &TrackerSnapshot, errors: &[FileError]) -> String {
        render_text(&self.synthesize(snapshot, errors))
    }

    pub fn synthesize(&self, snapshot: &TrackerSnapshot, errors: &[FileError]) -> AnalysisReport {
        let total_files = snapshot.total_files;
        let (high_null_total, high_null_fields) = self.high_null_fields(snapshot);

        let error_limit = self.config.error_preview_limit;
        let error_preview: Vec<String> = errors
            .iter()
            .take(error_limit)
            .map(ToString::to_string)
            .collect();

        AnalysisReport {
            generated_at: Utc::now().to_rfc3339(),
            total_files,
            distributions: self.distributions(snapshot),
            field_groups: self.field_groups(snapshot),
            lookup_candidates: self.lookup_candidates(snapshot),
            high_null_threshold: self.config.high_null_threshold,
            high_null_fields,
            high_null_total,
            errors_total: errors.len(),
            errors_omitted: errors.len().saturating_sub(error_preview.len()),
            errors: error_preview,
            default_value_sql: self.default_value_sql(),
        }
    }

    fn distributions(&self, snapshot: &TrackerSnapshot) -> Vec<DistributionSection> {
        self.headline_fields
            .iter()
            .map(|headline| {
                let mut entries: Vec<DistributionEntry> = snapshot
                    .distribution(&headline.key)
                    .into_iter()
                    .flatten()
                    .map(|(value, &count)| DistributionEntry {
                        value: value.clone(),
                        count,
                        percent: percent(count, snapshot.total_files),
                    })
                    .collect();
                entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

                DistributionSection {
                    field: headline.key.clone(),
                    label: headline.label.clone(),
                    entries,
                }
            })
            .collect()
    }

    fn field_groups(&self, snapshot: &TrackerSnapshot) -> Vec<FieldGroup> {
        // Snapshot fields are already ordered by path.
        let mut groups: BTreeMap<&str, Vec<FieldSummary>> = BTreeMap::new();
        for (path, field) in &snapshot.fields {
            groups
                .entry(top_level_group(path))
                .or_default()
                .push(self.summarize(path, field, snapshot.total_files));
        }

        groups
            .into_iter()
            .map(|(name, fields)| FieldGroup {
                name: name.to_string(),
                fields,
            })
            .collect()
    }

    fn summarize(&self, path: &str, field: &FieldObserver, total_files: usize) -> FieldSummary {
        let samples = self.is_lookup_candidate(path, field).then(|| {
            let limit = self.config.sample_display_limit;
            SampleDisplay {
                values: field.sample_values().take(limit).map(String::from).collect(),
                additional: field.distinct_sample_count().saturating_sub(limit),
            }
        });

        FieldSummary {
            path: path.to_string(),
            occurrences: field.occurrences(),
            occurrence_percent: percent(field.occurrences(), total_files),
            types: field.kinds().iter().copied().collect(),
            null_or_empty: field.null_or_empty(),
            null_percent: field.null_rate(),
            max_length: field
                .has_kind(ValueKind::String)
                .then(|| field.max_length()),
            numeric_range: field
                .numeric_range()
                .map(|(min, max)| NumericRange { min, max }),
            samples,
        }
    }

    fn lookup_candidates(&self, snapshot: &TrackerSnapshot) -> Vec<LookupCandidate> {
        let mut candidates: Vec<LookupCandidate> = snapshot
            .fields
            .iter()
            .filter(|(path, field)| self.is_lookup_candidate(path, field))
            .filter(|(_, field)| field.distinct_sample_count() <= self.config.lookup_table_max_values)
            .map(|(path, field)| LookupCandidate {
                path: path.clone(),
                distinct_values: field.distinct_sample_count(),
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.distinct_values
                .cmp(&b.distinct_values)
                .then_with(|| a.path.cmp(&b.path))
        });
        candidates
    }

    fn high_null_fields(&self, snapshot: &TrackerSnapshot) -> (usize, Vec<HighNullField>) {
        let mut fields: Vec<HighNullField> = snapshot
            .fields
            .iter()
            .filter(|(_, field)| field.null_rate() > self.config.high_null_threshold)
            .map(|(path, field)| HighNullField {
                path: path.clone(),
                null_percent: field.null_rate(),
                null_or_empty: field.null_or_empty(),
                occurrences: field.occurrences(),
            })
            .collect();
        fields.sort_by(|a, b| {
            b.null_percent
                .total_cmp(&a.null_percent)
                .then_with(|| a.path.cmp(&b.path))
        });

        let total = fields.len();
        fields.truncate(self.config.high_null_display_limit);
        (total, fields)
    }

    fn default_value_sql(&self) -> Vec<String> {
        self.config
            .seed_tables
            .iter()
            .map(|table| {
                format!(
                    "INSERT INTO {table} (id, name) VALUES (0, 'Unknown') ON CONFLICT (id) DO NOTHING;"
                )
            })
            .collect()
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
