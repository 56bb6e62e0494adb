use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ConfigFile {
    #[serde(default)]
    pub(super) service: ServiceSection,
    #[serde(default)]
    pub(super) project: ProjectSection,
    #[serde(default)]
    pub(super) readiness: ReadinessSection,
    #[serde(default)]
    pub(super) provision: ProvisionSection,
    #[serde(default)]
    pub(super) scan: ScanSection,
    #[serde(default)]
    pub(super) report: ReportSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ServiceSection {
    pub(super) host: Option<String>,
    pub(super) token: Option<String>,
    pub(super) user: Option<String>,
    pub(super) password: Option<String>,
    pub(super) http_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ProjectSection {
    pub(super) key: Option<String>,
    pub(super) name: Option<String>,
    pub(super) token_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ReadinessSection {
    pub(super) max_attempts: Option<u32>,
    pub(super) interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ProvisionSection {
    pub(super) retry_delay_ms: Option<u64>,
    pub(super) placeholder: Option<String>,
    pub(super) token_property: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ScanSection {
    pub(super) properties_file: Option<PathBuf>,
    pub(super) project_dir: Option<PathBuf>,
    pub(super) scanner_executable: Option<String>,
    pub(super) container_image: Option<String>,
    pub(super) extra_args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ReportSection {
    pub(super) json_output: Option<PathBuf>,
    pub(super) html_output: Option<PathBuf>,
    pub(super) source_root: Option<PathBuf>,
    pub(super) issues_page_size: Option<u32>,
    pub(super) max_issue_pages: Option<u32>,
}
