use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::wire::{
    IssuesSearchResponse, MeasuresResponse, ProjectStatusResponse, WireIssue, WireMeasure,
};
use crate::api::{ISSUES_SEARCH_PATH, SonarApi};
use crate::config::PipelineConfig;
use crate::error::{Result, SonarError};
use crate::models::{
    CodeContext, CodeLine, GateCondition, Issue, ProjectMeasures, QualityGate, QualityGateStatus,
    QualityReport, QualityReportParts, Severity,
};

pub const REPORT_METRIC_KEYS: [&str; 7] = [
    "coverage",
    "bugs",
    "vulnerabilities",
    "code_smells",
    "duplicated_lines_density",
    "lines",
    "lines_to_cover",
];

/// Lines shown on each side of an issue line.
pub const CODE_CONTEXT_RADIUS: u32 = 3;

const NOT_ANALYZED_GATE: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    pub page_size: u32,
    pub max_pages: u32,
    pub source_root: Option<PathBuf>,
}

impl AggregateOptions {
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            page_size: config.report.issues_page_size,
            max_pages: config.report.max_issue_pages,
            source_root: config.report.source_root.clone(),
        }
    }
}

/// Merges the gate verdict, project measures and unresolved issues of one
/// project into a new report snapshot.
pub fn aggregate<A>(api: &A, project_key: &str, options: &AggregateOptions) -> Result<QualityReport>
where
    A: SonarApi + ?Sized,
{
    let gate = fetch_quality_gate(api, project_key)?;
    let measures = fetch_measures(api, project_key)?;
    let mut issues = fetch_issues(api, project_key, options)?;
    if let Some(root) = &options.source_root {
        for issue in &mut issues {
            issue.code_context = issue
                .line
                .and_then(|line| read_code_context(root, &issue.file, line));
        }
    }

    info!(
        project = project_key,
        gate = %gate.status,
        issues = issues.len(),
        "report aggregated"
    );
    Ok(QualityReport::from_parts(
        QualityReportParts {
            project_key: project_key.to_string(),
            gate,
            measures,
            issues,
        },
        Utc::now(),
    ))
}

fn fetch_quality_gate<A>(api: &A, project_key: &str) -> Result<QualityGate>
where
    A: SonarApi + ?Sized,
{
    let response = api.quality_gate(project_key)?;
    if response.status == 404 {
        return Err(SonarError::NotAnalyzed(project_key.to_string()));
    }
    let body = response.expect_success::<ProjectStatusResponse>()?.project_status;
    if body.status.trim().eq_ignore_ascii_case(NOT_ANALYZED_GATE) {
        return Err(SonarError::NotAnalyzed(project_key.to_string()));
    }

    let conditions = body
        .conditions
        .into_iter()
        .map(|condition| GateCondition {
            metric_key: condition.metric_key,
            status: QualityGateStatus::from_reported(&condition.status),
            comparator: condition.comparator,
            error_threshold: condition.error_threshold,
            actual_value: condition.actual_value,
        })
        .collect();
    Ok(QualityGate {
        status: QualityGateStatus::from_reported(&body.status),
        conditions,
    })
}

fn fetch_measures<A>(api: &A, project_key: &str) -> Result<ProjectMeasures>
where
    A: SonarApi + ?Sized,
{
    let response = api.measures(project_key, &REPORT_METRIC_KEYS)?;
    let component = response.expect_success::<MeasuresResponse>()?.component;
    Ok(measures_from_wire(&component.measures))
}

fn measures_from_wire(measures: &[WireMeasure]) -> ProjectMeasures {
    let ratio = |metric: &str| {
        measure_value(measures, metric).and_then(|value| parse_measure::<f64>(metric, value))
    };
    let count = |metric: &str| {
        measure_value(measures, metric).and_then(|value| parse_measure::<u64>(metric, value))
    };

    ProjectMeasures {
        coverage_percent: ratio("coverage"),
        bugs: count("bugs"),
        vulnerabilities: count("vulnerabilities"),
        code_smells: count("code_smells"),
        duplicated_lines_percent: ratio("duplicated_lines_density"),
        lines: count("lines"),
        lines_to_cover: count("lines_to_cover"),
    }
}

fn measure_value<'a>(measures: &'a [WireMeasure], metric: &str) -> Option<&'a str> {
    measures
        .iter()
        .find(|measure| measure.metric == metric)
        .and_then(|measure| measure.value.as_deref())
}

fn parse_measure<T: std::str::FromStr>(metric: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse::<T>().ok();
    if parsed.is_none() {
        debug!(metric, value, "ignoring unparseable measure value");
    }
    parsed
}

fn fetch_issues<A>(api: &A, project_key: &str, options: &AggregateOptions) -> Result<Vec<Issue>>
where
    A: SonarApi + ?Sized,
{
    let mut issues = Vec::new();
    for page in 1..=options.max_pages {
        let response = api.issues_page(project_key, page, options.page_size)?;
        let batch = response.expect_success::<IssuesSearchResponse>()?;
        let total = batch.total_matches();
        let received = batch.issues.len();
        debug!(page, received, total = ?total, "issues page");
        if received == 0 {
            break;
        }
        for wire in batch.issues {
            issues.push(issue_from_wire(project_key, wire)?);
        }

        let fetched = u64::from(page) * u64::from(options.page_size);
        match total {
            Some(total) if fetched >= total => break,
            None if received < options.page_size as usize => break,
            _ if page == options.max_pages => {
                warn!(
                    pages = options.max_pages,
                    collected = issues.len(),
                    total = ?total,
                    "issue listing truncated at page ceiling"
                );
            }
            _ => {}
        }
    }
    Ok(issues)
}

fn issue_from_wire(project_key: &str, wire: WireIssue) -> Result<Issue> {
    let severity = wire
        .severity
        .parse::<Severity>()
        .map_err(|message| SonarError::Decode {
            endpoint: ISSUES_SEARCH_PATH.to_string(),
            message: format!("issue {}: {message}", wire.key),
        })?;
    let file = strip_component_prefix(project_key, &wire.component).to_string();

    Ok(Issue {
        key: wire.key,
        file,
        line: wire.line,
        message: wire.message.unwrap_or_default(),
        severity,
        rule: wire.rule,
        issue_type: wire.issue_type,
        effort: wire.effort,
        tags: wire.tags,
        code_context: None,
    })
}

/// `sample-project:src/app.py` becomes `src/app.py`.
fn strip_component_prefix<'a>(project_key: &str, component: &'a str) -> &'a str {
    component
        .strip_prefix(project_key)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(component)
}

/// Reads up to [`CODE_CONTEXT_RADIUS`] lines around `line` from
/// `root/file`. Unreadable files and out-of-range lines yield `None`.
#[must_use]
pub fn read_code_context(root: &Path, file: &str, line: u32) -> Option<CodeContext> {
    let source = std::fs::read_to_string(root.join(file)).ok()?;
    let lines = source.lines().collect::<Vec<_>>();
    let total = u32::try_from(lines.len()).ok()?;
    if line == 0 || line > total {
        return None;
    }

    let start_line = line.saturating_sub(CODE_CONTEXT_RADIUS).max(1);
    let end_line = line.saturating_add(CODE_CONTEXT_RADIUS).min(total);
    let lines = (start_line..=end_line)
        .map(|number| CodeLine {
            line: number,
            code: lines[(number - 1) as usize].to_string(),
            is_issue_line: number == line,
        })
        .collect();
    Some(CodeContext {
        start_line,
        end_line,
        lines,
    })
}
