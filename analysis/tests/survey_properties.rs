//! End-to-end properties of a survey run over real files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use schema_survey_analysis::{
    AnalysisError, AnalyzerConfig, DirectoryAnalyzer, ReportSynthesizer, SurveyConfig,
};
use schema_survey_core::ValueKind;
use serde_json::json;

fn write_json(dir: &Path, name: &str, doc: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, doc.to_string()).unwrap();
    path
}

fn analyze(dir: &Path) -> schema_survey_analysis::AnalysisOutcome {
    DirectoryAnalyzer::default().analyze(dir, "*.json").unwrap()
}

#[test]
fn test_invalid_file_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..100 {
        let name = format!("{i:03}.json");
        if i == 42 {
            fs::write(dir.path().join(&name), "{\"status\": \"Open\",").unwrap();
        } else {
            write_json(dir.path(), &name, &json!({ "id": i, "status": "Open" }));
        }
    }

    let outcome = analyze(dir.path());
    assert_eq!(outcome.files_discovered, 100);
    assert_eq!(outcome.snapshot.total_files, 99);
    assert_eq!(outcome.snapshot.field("root.id").unwrap().occurrences(), 99);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].path.ends_with("042.json"));

    let text = ReportSynthesizer::from_config(&SurveyConfig::default())
        .unwrap()
        .render(&outcome.snapshot, &outcome.errors);
    assert!(text.contains("## Processing Errors (1)"));
    assert!(text.contains("- 042.json: "));
}

#[test]
fn test_results_independent_of_order_and_batching() {
    let dir = tempfile::tempdir().unwrap();
    let statuses = ["Open", "Closed", "Pending"];
    let mut files = Vec::new();
    for i in 0..60 {
        let status = statuses[i % 3];
        let comment = if i % 5 == 0 { json!(null) } else { json!(format!("note {i}")) };
        let doc = json!({
            "id": i,
            "amount": (i as f64) * 1.5 - 20.0,
            "status": status,
            "comment": comment,
            "lines": (0..(i % 4)).map(|n| json!({ "qty": n })).collect::<Vec<_>>(),
        });
        files.push(write_json(dir.path(), &format!("{i:02}.json"), &doc));
    }

    let forward = DirectoryAnalyzer::default()
        .analyze_files(&files, &|_| {})
        .unwrap();

    let mut reversed = files.clone();
    reversed.reverse();
    let config = AnalyzerConfig {
        batch_size: 7,
        parallelism: Some(1),
        ..AnalyzerConfig::default()
    };
    let backward = DirectoryAnalyzer::new(config)
        .analyze_files(&reversed, &|_| {})
        .unwrap();

    assert_eq!(forward.snapshot, backward.snapshot);
    let amount = forward.snapshot.field("root.amount").unwrap();
    let (min, max) = amount.numeric_range().unwrap();
    assert_eq!(min, (-20).into());
    assert_eq!(max.to_string(), "68.5");
}

#[test]
fn test_null_or_empty_never_exceeds_occurrences() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), "a.json", &json!({ "x": null, "y": "", "z": ["", null, "v"] }));
    write_json(dir.path(), "b.json", &json!({ "x": "  ", "y": null, "z": [] }));

    let outcome = analyze(dir.path());
    for (path, field) in &outcome.snapshot.fields {
        assert!(field.null_or_empty() <= field.occurrences(), "{path}");
    }
    assert_eq!(outcome.snapshot.field("root.y").unwrap().null_or_empty(), 2);
    assert_eq!(outcome.snapshot.field("root.z[]").unwrap().null_or_empty(), 2);
}

#[test]
fn test_distribution_uses_processed_file_count() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        let status = if i < 6 { "Completed" } else { "Cancelled" };
        write_json(dir.path(), &format!("{i}.json"), &json!({ "status": status }));
    }

    let outcome = analyze(dir.path());
    let text = ReportSynthesizer::from_config(&SurveyConfig::default())
        .unwrap()
        .render(&outcome.snapshot, &outcome.errors);
    assert!(text.contains("- Completed: 6 (60.0%)"));
    assert!(text.contains("- Cancelled: 4 (40.0%)"));
}

#[test]
fn test_array_elements_counted_per_element() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), "tags.json", &json!({ "tags": ["a", "b", "c"] }));

    let outcome = analyze(dir.path());
    let tags = outcome.snapshot.field("root.tags[]").unwrap();
    assert_eq!(tags.occurrences(), 3);
    assert!(tags.has_kind(ValueKind::String));
    assert!(outcome.snapshot.field("root.tags[2]").is_some());
}

#[test]
fn test_lookup_detection_and_sample_cap() {
    let dir = tempfile::tempdir().unwrap();
    let statuses = ["Open", "Closed", "Pending"];
    for i in 0..250 {
        let status = statuses[i % 3];
        write_json(
            dir.path(),
            &format!("{i:03}.json"),
            &json!({
                "status": status,
                "comments": format!("free text {i}"),
                "groupCode": format!("G{i:03}"),
            }),
        );
    }

    let outcome = analyze(dir.path());
    let code = outcome.snapshot.field("root.groupCode").unwrap();
    assert_eq!(code.distinct_sample_count(), 100);

    let synthesizer = ReportSynthesizer::from_config(&SurveyConfig::default()).unwrap();
    let report = synthesizer.synthesize(&outcome.snapshot, &outcome.errors);
    let lookups: Vec<&str> = report
        .lookup_candidates
        .iter()
        .map(|c| c.path.as_str())
        .collect();
    assert_eq!(lookups, vec!["root.status"]);

    let text = schema_survey_analysis::render_text(&report);
    assert!(text.contains("- `root.status`: 3 distinct values"));
    assert!(text.contains("- **Sample Values:** Closed, Open, Pending\n"));
    assert!(text.contains("(+90 more)"));
    let comments = text.split("#### `root.comments`").nth(1).unwrap();
    let comments = comments.split("####").next().unwrap();
    assert!(!comments.contains("Sample Values"));
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let err = DirectoryAnalyzer::default()
        .analyze(&missing, "*.json")
        .unwrap_err();
    assert!(matches!(err, AnalysisError::DirectoryNotFound(_)));
    assert!(err.to_string().starts_with("directory not found"));
}
