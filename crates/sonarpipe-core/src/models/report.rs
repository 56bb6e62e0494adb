use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issue priority, declared most severe first so that the derived ordering
/// sorts BLOCKER before INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
}

impl Severity {
    pub const ALL: [Self; 5] = [
        Self::Blocker,
        Self::Critical,
        Self::Major,
        Self::Minor,
        Self::Info,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BLOCKER" => Ok(Self::Blocker),
            "CRITICAL" => Ok(Self::Critical),
            "MAJOR" => Ok(Self::Major),
            "MINOR" => Ok(Self::Minor),
            "INFO" => Ok(Self::Info),
            other => Err(format!("unknown issue severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityGateStatus {
    Ok,
    Error,
    Warn,
    Unknown,
}

impl QualityGateStatus {
    /// Maps a gate word from `/api/qualitygates/project_status`. `NONE` is
    /// not a verdict; callers treat it as "never analyzed" before calling this.
    #[must_use]
    pub fn from_reported(word: &str) -> Self {
        match word.trim().to_ascii_uppercase().as_str() {
            "OK" => Self::Ok,
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "PASSED",
            Self::Error => "FAILED",
            Self::Warn => "WARNING",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn passed(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for QualityGateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateCondition {
    pub metric_key: String,
    pub status: QualityGateStatus,
    pub comparator: Option<String>,
    pub error_threshold: Option<String>,
    pub actual_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGate {
    pub status: QualityGateStatus,
    pub conditions: Vec<GateCondition>,
}

/// Project-level measures. `None` means the service did not compute the
/// metric (for example, no coverage tool ran); it is never defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeasures {
    pub coverage_percent: Option<f64>,
    pub bugs: Option<u64>,
    pub vulnerabilities: Option<u64>,
    pub code_smells: Option<u64>,
    pub duplicated_lines_percent: Option<f64>,
    pub lines: Option<u64>,
    pub lines_to_cover: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLine {
    pub line: u32,
    pub code: String,
    pub is_issue_line: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeContext {
    pub start_line: u32,
    pub end_line: u32,
    pub lines: Vec<CodeLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub file: String,
    pub line: Option<u32>,
    pub message: String,
    pub severity: Severity,
    pub rule: String,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub effort: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub code_context: Option<CodeContext>,
}

pub type SeverityCounts = BTreeMap<Severity, usize>;

#[derive(Debug, Clone)]
pub struct QualityReportParts {
    pub project_key: String,
    pub gate: QualityGate,
    pub measures: ProjectMeasures,
    pub issues: Vec<Issue>,
}

/// Immutable post-scan snapshot for one project. Built once from the merged
/// API sources; the severity histogram is derived from `issues`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    project_key: String,
    snapshot_id: String,
    generated_at: String,
    quality_gate_status: QualityGateStatus,
    quality_gate_conditions: Vec<GateCondition>,
    coverage_percent: Option<f64>,
    bugs: Option<u64>,
    vulnerabilities: Option<u64>,
    code_smells: Option<u64>,
    duplicated_lines_percent: Option<f64>,
    lines: Option<u64>,
    lines_to_cover: Option<u64>,
    issues_by_severity: SeverityCounts,
    issues: Vec<Issue>,
}

impl QualityReport {
    #[must_use]
    pub fn from_parts(parts: QualityReportParts, generated_at: DateTime<Utc>) -> Self {
        let QualityReportParts {
            project_key,
            gate,
            measures,
            issues,
        } = parts;
        let issues_by_severity = count_by_severity(&issues);

        Self {
            project_key,
            snapshot_id: Uuid::new_v4().to_string(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            quality_gate_status: gate.status,
            quality_gate_conditions: gate.conditions,
            coverage_percent: measures.coverage_percent,
            bugs: measures.bugs,
            vulnerabilities: measures.vulnerabilities,
            code_smells: measures.code_smells,
            duplicated_lines_percent: measures.duplicated_lines_percent,
            lines: measures.lines,
            lines_to_cover: measures.lines_to_cover,
            issues_by_severity,
            issues,
        }
    }

    #[must_use]
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    #[must_use]
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    #[must_use]
    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    #[must_use]
    pub const fn quality_gate_status(&self) -> QualityGateStatus {
        self.quality_gate_status
    }

    #[must_use]
    pub fn quality_gate_conditions(&self) -> &[GateCondition] {
        &self.quality_gate_conditions
    }

    #[must_use]
    pub fn measures(&self) -> ProjectMeasures {
        ProjectMeasures {
            coverage_percent: self.coverage_percent,
            bugs: self.bugs,
            vulnerabilities: self.vulnerabilities,
            code_smells: self.code_smells,
            duplicated_lines_percent: self.duplicated_lines_percent,
            lines: self.lines,
            lines_to_cover: self.lines_to_cover,
        }
    }

    #[must_use]
    pub const fn issues_by_severity(&self) -> &SeverityCounts {
        &self.issues_by_severity
    }

    #[must_use]
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.issues_by_severity.get(&severity).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues of one severity in their original order.
    pub fn issues_with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }
}

fn count_by_severity(issues: &[Issue]) -> SeverityCounts {
    let mut counts = SeverityCounts::new();
    for issue in issues {
        *counts.entry(issue.severity).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(key: &str, severity: Severity) -> Issue {
        Issue {
            key: key.to_string(),
            file: "src/main.py".to_string(),
            line: Some(3),
            message: "Remove this unused import".to_string(),
            severity,
            rule: "python:S1128".to_string(),
            issue_type: Some("CODE_SMELL".to_string()),
            effort: None,
            tags: Vec::new(),
            code_context: None,
        }
    }

    fn report(issues: Vec<Issue>, measures: ProjectMeasures) -> QualityReport {
        QualityReport::from_parts(
            QualityReportParts {
                project_key: "sample-project".to_string(),
                gate: QualityGate {
                    status: QualityGateStatus::Ok,
                    conditions: Vec::new(),
                },
                measures,
                issues,
            },
            Utc::now(),
        )
    }

    #[test]
    fn severity_histogram_sums_to_issue_count() {
        let report = report(
            vec![
                issue("a", Severity::Major),
                issue("b", Severity::Minor),
                issue("c", Severity::Major),
                issue("d", Severity::Blocker),
            ],
            ProjectMeasures::default(),
        );
        let total = report.issues_by_severity().values().sum::<usize>();
        assert_eq!(total, report.issues().len());
        assert_eq!(report.severity_count(Severity::Major), 2);
        assert_eq!(report.severity_count(Severity::Info), 0);
        assert!(!report.issues_by_severity().contains_key(&Severity::Info));
    }

    #[test]
    fn severity_ordering_puts_blocker_first() {
        let mut severities = vec![Severity::Info, Severity::Major, Severity::Blocker];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Blocker, Severity::Major, Severity::Info]
        );
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert!("TRIVIAL".parse::<Severity>().is_err());
    }

    #[test]
    fn serialized_report_keeps_missing_measures_null() {
        let report = report(
            Vec::new(),
            ProjectMeasures {
                bugs: Some(0),
                ..ProjectMeasures::default()
            },
        );
        let value = serde_json::to_value(&report).expect("serialize");
        assert!(value["coveragePercent"].is_null());
        assert_eq!(value["bugs"], serde_json::json!(0));
        assert_eq!(value["qualityGateStatus"], serde_json::json!("OK"));
        assert_eq!(value["issuesBySeverity"], serde_json::json!({}));
    }

    #[test]
    fn gate_words_map_to_known_statuses() {
        assert_eq!(QualityGateStatus::from_reported("ERROR"), QualityGateStatus::Error);
        assert_eq!(QualityGateStatus::from_reported("ok"), QualityGateStatus::Ok);
        assert_eq!(QualityGateStatus::from_reported("SOMETHING"), QualityGateStatus::Unknown);
        assert_eq!(QualityGateStatus::Error.label(), "FAILED");
    }
}
