//! Value kinds and per-field statistics.
//!
//! This module defines the accumulator used for every field path discovered
//! while walking a document tree. The types are designed for serialization
//! with [`serde`] so a finished set of statistics can be handed to a
//! downstream schema builder as JSON or YAML.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Maximum number of distinct sample strings retained per field.
///
/// Values seen after the cap is reached are dropped, not sampled.
pub const MAX_SAMPLE_VALUES: usize = 100;

/// Kind of value observed at a field path.
///
/// Ordered so that a set of kinds always renders in the same sequence.
///
/// # Examples
///
/// ```
/// use schema_survey_core::ValueKind;
///
/// assert_eq!(ValueKind::LargeNumber.to_string(), "large-number");
/// assert_eq!(ValueKind::String.as_str(), "string");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    /// A number that does not fit the decimal representation used for
    /// ranges. Its value is not retained.
    LargeNumber,
}

impl ValueKind {
    /// Returns the lowercase tag used in reports and serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
            Self::LargeNumber => "large-number",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value handed to [`FieldObserver::observe`].
///
/// Composite nodes are reduced to a marker; their children are observed
/// under their own paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation<'a> {
    Null,
    String(&'a str),
    Number(&'a Number),
    Bool(bool),
    Array,
    Object,
}

impl<'a> From<&'a Value> for Observation<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// Converts a JSON number into a [`Decimal`], or `None` when it does not fit.
///
/// # Examples
///
/// ```
/// use schema_survey_core::number_to_decimal;
///
/// let small: serde_json::Number = serde_json::from_str("12.5").unwrap();
/// assert!(number_to_decimal(&small).is_some());
///
/// let huge: serde_json::Number = serde_json::from_str("1e40").unwrap();
/// assert!(number_to_decimal(&huge).is_none());
/// ```
pub fn number_to_decimal(number: &Number) -> Option<Decimal> {
    if let Some(i) = number.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = number.as_u64() {
        return Some(Decimal::from(u));
    }
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Accumulated statistics for one field path.
///
/// An observer only ever grows: every call to [`observe`](Self::observe)
/// bumps the occurrence count and widens the type set, length and range.
/// It cannot fail; numbers outside the decimal range degrade to
/// [`ValueKind::LargeNumber`].
///
/// # Examples
///
/// ```
/// use schema_survey_core::{FieldObserver, Observation, ValueKind};
///
/// let mut field = FieldObserver::new();
/// field.observe(Observation::String("Completed"));
/// field.observe(Observation::String(""));
/// field.observe(Observation::Null);
///
/// assert_eq!(field.occurrences(), 3);
/// assert_eq!(field.null_or_empty(), 2);
/// assert!(field.has_kind(ValueKind::Null));
/// assert_eq!(field.sample_values().collect::<Vec<_>>(), vec!["Completed"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldObserver {
    occurrences: usize,
    null_or_empty: usize,
    kinds: BTreeSet<ValueKind>,
    /// Lowercased key → first spelling seen.
    samples: BTreeMap<String, String>,
    max_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<Decimal>,
}

impl FieldObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observed value.
    pub fn observe(&mut self, value: Observation<'_>) {
        self.occurrences += 1;

        match value {
            Observation::Null => {
                self.null_or_empty += 1;
                self.kinds.insert(ValueKind::Null);
            }
            Observation::String(s) => {
                if s.is_empty() {
                    self.null_or_empty += 1;
                }
                self.kinds.insert(ValueKind::String);
                self.max_length = self.max_length.max(s.chars().count());
                self.add_sample(s.trim());
            }
            Observation::Number(n) => match number_to_decimal(n) {
                Some(d) => {
                    self.kinds.insert(ValueKind::Number);
                    self.widen_range(d, d);
                }
                None => {
                    self.kinds.insert(ValueKind::LargeNumber);
                }
            },
            Observation::Bool(_) => {
                self.kinds.insert(ValueKind::Boolean);
            }
            Observation::Array => {
                self.kinds.insert(ValueKind::Array);
            }
            Observation::Object => {
                self.kinds.insert(ValueKind::Object);
            }
        }
    }

    /// Folds another observer's statistics into this one.
    ///
    /// Merging is associative and commutative for every statistic except
    /// which samples survive once the cap is reached.
    pub fn merge(&mut self, other: &FieldObserver) {
        self.occurrences += other.occurrences;
        self.null_or_empty += other.null_or_empty;
        self.kinds.extend(other.kinds.iter().copied());
        self.max_length = self.max_length.max(other.max_length);
        if let (Some(min), Some(max)) = (other.min, other.max) {
            self.widen_range(min, max);
        }
        for (key, value) in &other.samples {
            if self.samples.len() >= MAX_SAMPLE_VALUES {
                break;
            }
            self.samples
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    fn add_sample(&mut self, trimmed: &str) {
        if trimmed.is_empty() || self.samples.len() >= MAX_SAMPLE_VALUES {
            return;
        }
        let key = trimmed.to_lowercase();
        if !self.samples.contains_key(&key) {
            self.samples.insert(key, trimmed.to_string());
        }
    }

    fn widen_range(&mut self, low: Decimal, high: Decimal) {
        self.min = Some(self.min.map_or(low, |m| m.min(low)));
        self.max = Some(self.max.map_or(high, |m| m.max(high)));
    }

    /// Total number of observations.
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Observations that were `null` or an empty string.
    pub fn null_or_empty(&self) -> usize {
        self.null_or_empty
    }

    /// Null/empty observations as a percentage of this field's own
    /// occurrences.
    pub fn null_rate(&self) -> f64 {
        if self.occurrences == 0 {
            return 0.0;
        }
        self.null_or_empty as f64 / self.occurrences as f64 * 100.0
    }

    /// Every kind observed at this path, in [`ValueKind`] order.
    pub fn kinds(&self) -> &BTreeSet<ValueKind> {
        &self.kinds
    }

    pub fn has_kind(&self, kind: ValueKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// True when strings are the only kind ever observed.
    pub fn is_string_only(&self) -> bool {
        self.kinds.len() == 1 && self.has_kind(ValueKind::String)
    }

    /// True when a downstream column for this field must accept NULL.
    pub fn is_nullable(&self) -> bool {
        self.null_or_empty > 0 || self.has_kind(ValueKind::Null)
    }

    /// Longest string seen, in characters. Zero when no string was seen.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Inclusive numeric range, once at least one number has been seen.
    pub fn numeric_range(&self) -> Option<(Decimal, Decimal)> {
        self.min.zip(self.max)
    }

    /// Distinct sample values in case-insensitive sorted order.
    pub fn sample_values(&self) -> impl Iterator<Item = &str> {
        self.samples.values().map(String::as_str)
    }

    /// Number of distinct samples retained (at most [`MAX_SAMPLE_VALUES`]).
    pub fn distinct_sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observe_all(values: &[Value]) -> FieldObserver {
        let mut field = FieldObserver::new();
        for value in values {
            field.observe(Observation::from(value));
        }
        field
    }

    #[test]
    fn test_null_and_empty_strings_count_as_null_or_empty() {
        let field = observe_all(&[json!(null), json!(""), json!(" "), json!("x")]);
        assert_eq!(field.occurrences(), 4);
        assert_eq!(field.null_or_empty(), 2);
        assert!(field.null_or_empty() <= field.occurrences());
        assert!(field.is_nullable());
    }

    #[test]
    fn test_kinds_accumulate_in_order() {
        let field = observe_all(&[json!(true), json!("a"), json!({}), json!([]), json!(1)]);
        let kinds: Vec<&str> = field.kinds().iter().map(|k| k.as_str()).collect();
        assert_eq!(kinds, vec!["string", "number", "boolean", "array", "object"]);
        assert!(!field.is_string_only());
    }

    #[test]
    fn test_samples_dedupe_case_insensitively_and_trim() {
        let field = observe_all(&[json!("Approved"), json!(" approved "), json!("APPROVED")]);
        assert_eq!(field.distinct_sample_count(), 1);
        assert_eq!(field.sample_values().next(), Some("Approved"));
    }

    #[test]
    fn test_sample_cap_drops_overflow() {
        let mut field = FieldObserver::new();
        for i in 0..250 {
            field.observe(Observation::String(&format!("value-{i}")));
        }
        assert_eq!(field.occurrences(), 250);
        assert_eq!(field.distinct_sample_count(), MAX_SAMPLE_VALUES);
        assert!(field.sample_values().any(|v| v == "value-0"));
        assert!(!field.sample_values().any(|v| v == "value-200"));
    }

    #[test]
    fn test_max_length_counts_characters_of_untrimmed_value() {
        let field = observe_all(&[json!("abc"), json!("  héllo  "), json!("")]);
        assert_eq!(field.max_length(), 9);
    }

    #[test]
    fn test_numeric_range_widens() {
        let field = observe_all(&[json!(5), json!(-2.5), json!(100)]);
        let (min, max) = field.numeric_range().unwrap();
        assert_eq!(min, Decimal::from_str("-2.5").unwrap());
        assert_eq!(max, Decimal::from(100));
        assert!(field.has_kind(ValueKind::Number));
    }

    #[test]
    fn test_range_undefined_without_numbers() {
        let field = observe_all(&[json!("a"), json!(null)]);
        assert_eq!(field.numeric_range(), None);
    }

    #[test]
    fn test_large_number_degrades_to_tag() {
        let field = observe_all(&[json!(1e30)]);
        assert!(field.has_kind(ValueKind::LargeNumber));
        assert!(!field.has_kind(ValueKind::Number));
        assert_eq!(field.numeric_range(), None);
        assert_eq!(field.occurrences(), 1);
    }

    #[test]
    fn test_u64_max_fits_decimal() {
        let field = observe_all(&[json!(u64::MAX)]);
        assert!(field.has_kind(ValueKind::Number));
        assert_eq!(field.numeric_range().unwrap().1, Decimal::from(u64::MAX));
    }

    #[test]
    fn test_merge_matches_sequential_observation() {
        let values = [json!("a"), json!(null), json!(3), json!(""), json!(-7), json!("B")];
        let whole = observe_all(&values);

        let mut left = observe_all(&values[..3]);
        let right = observe_all(&values[3..]);
        left.merge(&right);

        assert_eq!(left.occurrences(), whole.occurrences());
        assert_eq!(left.null_or_empty(), whole.null_or_empty());
        assert_eq!(left.kinds(), whole.kinds());
        assert_eq!(left.numeric_range(), whole.numeric_range());
        assert_eq!(left.max_length(), whole.max_length());
    }

    #[test]
    fn test_serde_roundtrip_preserves_statistics() {
        let field = observe_all(&[json!("Initiated"), json!(12), json!(null)]);
        let raw = serde_json::to_string(&field).unwrap();
        assert!(raw.contains("\"null\""));
        let back: FieldObserver = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, field);
    }
}
