use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SonarError>;

#[derive(Debug, Error)]
pub enum SonarError {
    #[error("service did not become ready after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("provisioning failed at {stage}: status={} body={body_excerpt}", display_status(.status))]
    Provision {
        stage: ProvisionStage,
        status: Option<u16>,
        body_excerpt: String,
    },

    #[error("scan command `{command}` exited with {}", display_exit_code(.exit_code))]
    ScanFailure {
        exit_code: Option<i32>,
        command: String,
    },

    #[error("request to {endpoint} failed: status={status} body={body_excerpt}")]
    Fetch {
        endpoint: String,
        status: u16,
        body_excerpt: String,
    },

    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("project {0} has not been analyzed yet")]
    NotAnalyzed(String),

    #[error("could not write report file {}: {source}", .path.display())]
    RenderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStage {
    CreateProject,
    GenerateToken,
    ScanConfig,
}

impl ProvisionStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateProject => "create-project",
            Self::GenerateToken => "generate-token",
            Self::ScanConfig => "scan-config",
        }
    }
}

impl std::fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage an error is attributed to in user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Config,
    Readiness,
    Provision,
    Scan,
    Aggregate,
    Render,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Readiness => "readiness",
            Self::Provision => "provision",
            Self::Scan => "scan",
            Self::Aggregate => "aggregate",
            Self::Render => "render",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub stage: Stage,
    pub message: String,
    pub fatal: bool,
}

impl SonarError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "TIMEOUT",
            Self::Provision { .. } => "PROVISION_ERROR",
            Self::ScanFailure { .. } => "SCAN_FAILURE",
            Self::Fetch { .. } => "FETCH_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::NotAnalyzed(_) => "NOT_ANALYZED",
            Self::RenderIo { .. } => "RENDER_IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Toml(_) => "TOML_ERROR",
            Self::Http(_) => "HTTP_ERROR",
        }
    }

    /// Stage inferred from the error kind alone. Transport and decode errors
    /// are attributed to aggregation, the only stage that propagates them
    /// unwrapped; callers that meet them elsewhere name the stage themselves.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Timeout { .. } => Stage::Readiness,
            Self::Provision { .. } => Stage::Provision,
            Self::ScanFailure { .. } => Stage::Scan,
            Self::Fetch { .. } | Self::Decode { .. } | Self::NotAnalyzed(_) | Self::Http(_) => {
                Stage::Aggregate
            }
            Self::RenderIo { .. } | Self::Json(_) => Stage::Render,
            Self::Config(_) | Self::Toml(_) | Self::Io(_) => Stage::Config,
        }
    }

    /// Whether the whole run must stop. Missing reports are only warnings once
    /// the scan itself has completed.
    pub const fn is_fatal_to_pipeline(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Provision { .. }
                | Self::ScanFailure { .. }
                | Self::Config(_)
                | Self::Toml(_)
        )
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            stage: self.stage(),
            message: self.to_string(),
            fatal: self.is_fatal_to_pipeline(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

fn display_exit_code(exit_code: &Option<i32>) -> String {
    exit_code.map_or_else(
        || "no exit code (failed to start)".to_string(),
        |code| format!("exit code {code}"),
    )
}
