//! Response shapes of the service endpoints. Only the fields the pipeline
//! reads are declared; everything else in the payloads is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatusResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Error envelope returned with 4xx answers: `{"errors":[{"msg":"..."}]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    pub msg: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedToken {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusResponse {
    pub project_status: ProjectStatusBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectStatusBody {
    pub status: String,
    #[serde(default)]
    pub conditions: Vec<WireCondition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCondition {
    pub status: String,
    pub metric_key: String,
    #[serde(default)]
    pub comparator: Option<String>,
    #[serde(default)]
    pub error_threshold: Option<String>,
    #[serde(default)]
    pub actual_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasuresResponse {
    pub component: MeasuredComponent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasuredComponent {
    pub key: String,
    #[serde(default)]
    pub measures: Vec<WireMeasure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMeasure {
    pub metric: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesSearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(default)]
    pub issues: Vec<WireIssue>,
}

impl IssuesSearchResponse {
    /// Total matches across all pages. Older servers only report the
    /// top-level `total`.
    #[must_use]
    pub fn total_matches(&self) -> Option<u64> {
        self.paging.as_ref().map(|paging| paging.total).or(self.total)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_index: u32,
    pub page_size: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireIssue {
    pub key: String,
    pub component: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    pub severity: String,
    pub rule: String,
    #[serde(rename = "type", default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub effort: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_page_prefers_paging_total() {
        let page = serde_json::from_str::<IssuesSearchResponse>(
            r#"{"total": 9, "paging": {"pageIndex": 1, "pageSize": 2, "total": 3}, "issues": []}"#,
        )
        .expect("decode");
        assert_eq!(page.total_matches(), Some(3));

        let legacy =
            serde_json::from_str::<IssuesSearchResponse>(r#"{"total": 9, "issues": []}"#)
                .expect("decode");
        assert_eq!(legacy.total_matches(), Some(9));
    }

    #[test]
    fn token_response_tolerates_missing_secret() {
        let token = serde_json::from_str::<GeneratedToken>(r#"{"login":"admin","name":"t"}"#)
            .expect("decode");
        assert!(token.token.is_none());
    }
}
