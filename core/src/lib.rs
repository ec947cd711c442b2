//! Core types for schema inference over loosely structured JSON.
//!
//! This crate defines the per-field accumulator used while surveying a
//! large collection of documents:
//!
//! - [`FieldObserver`]: occurrence, null/empty, type, length, range and
//!   sample statistics for one field path.
//! - [`ValueKind`]: the type tags an observer records.
//! - [`Observation`]: the typed value handed to an observer.
//!
//! Path helpers ([`child_path`], [`indexed_path`], [`wildcard_path`],
//! [`top_level_group`], [`leaf_name`]) build and inspect the dotted/bracketed
//! field paths the observers are keyed by.
//!
//! # Example
//!
//! ```
//! use schema_survey_core::*;
//!
//! let doc = serde_json::json!({ "status": "Approved", "amount": 12.5 });
//! let mut status = FieldObserver::new();
//! status.observe(Observation::from(&doc["status"]));
//!
//! assert!(status.is_string_only());
//! assert_eq!(status.distinct_sample_count(), 1);
//! assert_eq!(child_path(ROOT_PATH, "status"), "root.status");
//! ```

mod path;
mod types;

pub use path::{
    OTHER_GROUP, ROOT_PATH, child_path, indexed_path, leaf_name, top_level_group, wildcard_path,
};
pub use types::*;
