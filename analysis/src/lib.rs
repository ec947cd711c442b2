//! Schema inference and statistics over directories of JSON documents.
//!
//! This crate surveys a large, loosely structured document collection and
//! reports what its effective schema looks like, field by field:
//!
//! - [`DirectoryAnalyzer`]: finds matching files, processes them in
//!   sequential batches on a bounded worker pool and captures per-file
//!   errors without aborting the run.
//! - [`SchemaTracker`]: the concurrent path → [`FieldObserver`] map fed by
//!   every worker, frozen into a [`TrackerSnapshot`] at the end of a run.
//! - [`ReportSynthesizer`]: turns a snapshot into an [`AnalysisReport`]
//!   with distributions, grouped field statistics, lookup-table candidates,
//!   high-null-rate warnings and default-row SQL.
//!
//! # Example
//!
//! ```no_run
//! use schema_survey_analysis::{DirectoryAnalyzer, ReportSynthesizer, SurveyConfig};
//!
//! let config = SurveyConfig::default();
//! let outcome = DirectoryAnalyzer::new(config.analysis.clone())
//!     .analyze("data/movements", "*.json")
//!     .unwrap();
//! let text = ReportSynthesizer::from_config(&config)
//!     .unwrap()
//!     .render(&outcome.snapshot, &outcome.errors);
//! println!("{text}");
//! ```
//!
//! [`FieldObserver`]: schema_survey_core::FieldObserver

pub mod analyzer;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod tracker;

pub use analyzer::{AnalysisOutcome, DirectoryAnalyzer, Progress, collect_input_files};
pub use config::{AnalyzerConfig, HeadlineField, ReportConfig, SurveyConfig};
pub use error::{AnalysisError, FileError, Result};
pub use output::{OutputFormat, format_report, format_snapshot, render_text, write_output};
pub use report::{AnalysisReport, ReportSynthesizer};
pub use tracker::{SchemaTracker, TrackerSnapshot};
