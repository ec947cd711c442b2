//! Output formatting for reports and snapshots.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::report::{AnalysisReport, FieldSummary};
use crate::tracker::TrackerSnapshot;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable markdown-like text.
    #[default]
    Text,
    Json,
    Yaml,
}

/// Formats a report in the requested output format.
pub fn format_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
    }
}

/// Formats the raw field statistics for a downstream schema builder.
///
/// Text output has no snapshot layout of its own and falls back to JSON.
pub fn format_snapshot(snapshot: &TrackerSnapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(snapshot)?),
        OutputFormat::Text | OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
    }
}

/// Writes `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Renders the markdown-like text report.
///
/// Sections always appear in the same order; a section without data shows
/// `_None_`.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("# JSON Schema Analysis Report\n\n");
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!("- **Total Files Analyzed:** {}\n", report.total_files));
    out.push_str(&format!("- **Processing Errors:** {}\n", report.errors_total));
    out.push('\n');

    for section in &report.distributions {
        out.push_str(&format!("## {} Distribution\n\n", section.label));
        if section.entries.is_empty() {
            out.push_str("_None_\n");
        }
        for entry in &section.entries {
            out.push_str(&format!("- {}: {} ({:.1}%)\n", entry.value, entry.count, entry.percent));
        }
        out.push('\n');
    }

    out.push_str("## Field Analysis\n\n");
    if report.field_groups.is_empty() {
        out.push_str("_None_\n\n");
    }
    for group in &report.field_groups {
        out.push_str(&format!("### {}\n\n", group.name));
        for field in &group.fields {
            push_field(&mut out, field);
        }
    }

    out.push_str("## Potential Lookup Tables\n\n");
    if report.lookup_candidates.is_empty() {
        out.push_str("_None_\n");
    }
    for candidate in &report.lookup_candidates {
        out.push_str(&format!(
            "- `{}`: {} distinct values\n",
            candidate.path, candidate.distinct_values
        ));
    }
    out.push('\n');

    out.push_str(&format!("## High Null Rate Fields (>{}%)\n\n", report.high_null_threshold));
    if report.high_null_fields.is_empty() {
        out.push_str("_None_\n");
    }
    for field in &report.high_null_fields {
        out.push_str(&format!(
            "- `{}`: {:.1}% null/empty ({} of {})\n",
            field.path, field.null_percent, field.null_or_empty, field.occurrences
        ));
    }

    let hidden = report
        .high_null_total
        .saturating_sub(report.high_null_fields.len());
    if hidden > 0 {
        out.push_str(&format!("- ... and {hidden} more fields\n"));
    }
    out.push('\n');

    out.push_str(&format!("## Processing Errors ({})\n\n", report.errors_total));
    if report.errors.is_empty() {
        out.push_str("_None_\n");
    }
    for error in &report.errors {
        out.push_str(&format!("- {error}\n"));
    }
    if report.errors_omitted > 0 {
        out.push_str(&format!("- ... and {} more errors\n", report.errors_omitted));
    }
    out.push('\n');

    out.push_str("## Default Value SQL\n\n```sql\n");
    for statement in &report.default_value_sql {
        out.push_str(statement);
        out.push('\n');
    }
    out.push_str("```\n");

    out
}

fn push_field(out: &mut String, field: &FieldSummary) {
    out.push_str(&format!("#### `{}`\n\n", field.path));
    out.push_str(&format!(
        "- **Occurrences:** {} ({:.1}%)\n",
        field.occurrences, field.occurrence_percent
    ));
    let types: Vec<&str> = field.types.iter().map(|kind| kind.as_str()).collect();
    out.push_str(&format!("- **Types:** {}\n", types.join(", ")));
    out.push_str(&format!(
        "- **Null/Empty:** {} ({:.1}%)\n",
        field.null_or_empty, field.null_percent
    ));
    if let Some(max_length) = field.max_length {
        out.push_str(&format!("- **Max Length:** {max_length}\n"));
    }
    if let Some(range) = &field.numeric_range {
        out.push_str(&format!("- **Range:** {} to {}\n", range.min, range.max));
    }
    if let Some(samples) = &field.samples {
        out.push_str(&format!("- **Sample Values:** {}", samples.values.join(", ")));
        if samples.additional > 0 {
            out.push_str(&format!(" (+{} more)", samples.additional));
        }
        out.push('\n');
    }
    out.push('\n');
}
