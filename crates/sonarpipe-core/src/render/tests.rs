use chrono::Utc;
use tempfile::tempdir;

use super::*;
use crate::models::{
    CodeContext, CodeLine, GateCondition, Issue, ProjectMeasures, QualityGate, QualityGateStatus,
    QualityReportParts, Severity,
};

fn issue(key: &str, severity: Severity, message: &str) -> Issue {
    Issue {
        key: key.to_string(),
        file: "src/app.py".to_string(),
        line: Some(7),
        message: message.to_string(),
        severity,
        rule: "python:S1481".to_string(),
        issue_type: Some("CODE_SMELL".to_string()),
        effort: Some("5min".to_string()),
        tags: Vec::new(),
        code_context: None,
    }
}

fn failed_report() -> QualityReport {
    QualityReport::from_parts(
        QualityReportParts {
            project_key: "sample-project".to_string(),
            gate: QualityGate {
                status: QualityGateStatus::Error,
                conditions: vec![GateCondition {
                    metric_key: "new_coverage".to_string(),
                    status: QualityGateStatus::Error,
                    comparator: Some("LT".to_string()),
                    error_threshold: Some("80".to_string()),
                    actual_value: Some("42.0".to_string()),
                }],
            },
            measures: ProjectMeasures {
                coverage_percent: Some(85.0),
                bugs: Some(3),
                vulnerabilities: Some(0),
                code_smells: Some(12),
                duplicated_lines_percent: Some(1.2),
                lines: None,
                lines_to_cover: None,
            },
            issues: vec![
                issue("i1", Severity::Major, "Remove unused variable"),
                issue("i2", Severity::Minor, "Rename <tmp> & friends"),
                issue("i3", Severity::Major, "Reduce complexity"),
            ],
        },
        Utc::now(),
    )
}

fn report_without_coverage() -> QualityReport {
    QualityReport::from_parts(
        QualityReportParts {
            project_key: "sample-project".to_string(),
            gate: QualityGate {
                status: QualityGateStatus::Ok,
                conditions: Vec::new(),
            },
            measures: ProjectMeasures {
                bugs: Some(0),
                ..ProjectMeasures::default()
            },
            issues: Vec::new(),
        },
        Utc::now(),
    )
}

#[test]
fn json_histogram_matches_issue_list() {
    let rendered = render(&failed_report()).expect("render");
    let value = serde_json::from_str::<serde_json::Value>(&rendered.json).expect("parse json");

    assert_eq!(value["qualityGateStatus"], "ERROR");
    assert_eq!(
        value["issuesBySeverity"],
        serde_json::json!({"MAJOR": 2, "MINOR": 1})
    );
    let histogram_total = value["issuesBySeverity"]
        .as_object()
        .expect("object")
        .values()
        .filter_map(serde_json::Value::as_u64)
        .sum::<u64>();
    let issue_count = value["issues"].as_array().expect("issues").len() as u64;
    assert_eq!(histogram_total, issue_count);
    assert_eq!(value["coveragePercent"], 85.0);
    assert!(value["lines"].is_null());
}

#[test]
fn html_marks_failed_gate_and_groups_by_severity() {
    let html = render(&failed_report()).expect("render").html;

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("data-status=\"ERROR\""));
    assert!(html.contains("Quality Gate: FAILED"));
    assert!(html.contains("#F44336"));
    assert!(!html.contains("<script"));
    assert!(!html.contains("<link"));

    let major = html.find("id=\"severity-major\"").expect("major section");
    let minor = html.find("id=\"severity-minor\"").expect("minor section");
    assert!(major < minor);
    assert!(!html.contains("id=\"severity-blocker\""));
    assert_eq!(html.matches("<section class=\"severity-group\"").count(), 2);
    assert!(html.contains("Rename &lt;tmp&gt; &amp; friends"));
}

#[test]
fn html_shows_no_number_for_missing_coverage() {
    let html = render(&report_without_coverage()).expect("render").html;
    let card_start = html.find("id=\"metric-coverage\"").expect("coverage card");
    let card = &html[card_start..card_start + html[card_start..].find("</div></div>").expect("end")];
    assert!(card.contains("N/A"));
    assert!(!card.chars().any(|ch| ch.is_ascii_digit()));
    assert!(html.contains("Quality Gate: PASSED"));
    assert!(html.contains("No open issues."));
}

#[test]
fn html_renders_code_context_with_highlighted_line() {
    let mut issue = issue("i1", Severity::Blocker, "Null dereference");
    issue.code_context = Some(CodeContext {
        start_line: 6,
        end_line: 8,
        lines: vec![
            CodeLine {
                line: 6,
                code: "if x:".to_string(),
                is_issue_line: false,
            },
            CodeLine {
                line: 7,
                code: "    y = x.value < 3".to_string(),
                is_issue_line: true,
            },
            CodeLine {
                line: 8,
                code: "return y".to_string(),
                is_issue_line: false,
            },
        ],
    });
    let report = QualityReport::from_parts(
        QualityReportParts {
            project_key: "sample-project".to_string(),
            gate: QualityGate {
                status: QualityGateStatus::Warn,
                conditions: Vec::new(),
            },
            measures: ProjectMeasures::default(),
            issues: vec![issue],
        },
        Utc::now(),
    );

    let html = render_html(&report);
    assert!(html.contains("<span class=\"hit\">   7 |     y = x.value &lt; 3</span>"));
    assert!(html.contains("Quality Gate: WARNING"));
}

#[test]
fn write_report_creates_parent_directories() {
    let temp = tempdir().expect("tempdir");
    let paths = ReportPaths {
        json: temp.path().join("out/report.json"),
        html: temp.path().join("out/html/report.html"),
    };
    let rendered = render(&failed_report()).expect("render");
    write_report(&rendered, &paths).expect("write");

    assert_eq!(
        std::fs::read_to_string(&paths.json).expect("json"),
        rendered.json
    );
    assert!(paths.html.exists());
}

#[test]
fn write_report_failure_names_the_path() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").expect("seed");
    let paths = ReportPaths {
        json: blocker.join("report.json"),
        html: temp.path().join("report.html"),
    };

    match write_report(&render(&failed_report()).expect("render"), &paths) {
        Err(SonarError::RenderIo { path, .. }) => assert_eq!(path, paths.json),
        other => panic!("expected render io error, got: {other:?}"),
    }
    assert!(!paths.html.exists());
}

#[test]
fn html_failure_leaves_no_json_behind() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").expect("seed");
    let paths = ReportPaths {
        json: temp.path().join("report.json"),
        html: blocker.join("report.html"),
    };

    match write_report(&render(&failed_report()).expect("render"), &paths) {
        Err(SonarError::RenderIo { path, .. }) => assert_eq!(path, paths.html),
        other => panic!("expected render io error, got: {other:?}"),
    }
    assert!(!paths.json.exists());
    let entries = std::fs::read_dir(temp.path()).expect("list").count();
    assert_eq!(entries, 1);
}

#[test]
fn summaries_list_counts_and_keep_missing_measures_unnumbered() {
    let chat = format_chat_summary(&failed_report());
    assert!(chat.starts_with("*Quality Gate:* FAILED (ERROR)"));
    assert!(chat.contains("*Coverage:* 85.0%"));
    assert!(chat.contains("  - MAJOR: 2\n  - MINOR: 1\n"));
    assert!(!chat.contains("BLOCKER"));

    let plain = format_plain_summary(&report_without_coverage());
    assert!(plain.contains("Quality Gate Status: OK"));
    assert!(plain.contains("  - Coverage: N/A"));
    assert!(plain.contains("  - Bugs: 0"));
    assert!(plain.contains("  - BLOCKER: 0"));
}
