use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::wire::{ErrorEnvelope, GeneratedToken};
use crate::api::{ApiResponse, SonarApi};
use crate::config::PipelineConfig;
use crate::error::{ProvisionStage, Result, SonarError};
use crate::models::{AuthToken, AuthTokenSummary, ProjectCreation, ProjectResource};
use crate::scan_config::{ScanConfigArtifact, TokenWrite};
use crate::text::body_excerpt;

const ALREADY_EXISTS_MARKER: &str = "already exist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub project_key: String,
    pub project_name: String,
    pub token_name: String,
    pub retry_delay: Duration,
}

impl ProvisionRequest {
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            project_key: config.project.key.clone(),
            project_name: config.project.name.clone(),
            token_name: config.project.token_name.clone(),
            retry_delay: config.provision_retry_delay(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub project: ProjectResource,
    pub creation: ProjectCreation,
    pub token: AuthToken,
    pub token_attempts: u32,
    pub token_write: TokenWrite,
    pub artifact: PathBuf,
}

impl ProvisionOutcome {
    #[must_use]
    pub fn summary(&self) -> ProvisionSummary {
        ProvisionSummary {
            project: self.project.clone(),
            creation: self.creation,
            token: self.token.summary(),
            token_attempts: self.token_attempts,
            token_write: self.token_write,
            artifact: self.artifact.display().to_string(),
        }
    }
}

/// Printable view of a [`ProvisionOutcome`]; carries only a token prefix.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionSummary {
    pub project: ProjectResource,
    pub creation: ProjectCreation,
    pub token: AuthTokenSummary,
    pub token_attempts: u32,
    pub token_write: TokenWrite,
    pub artifact: String,
}

pub fn provision<A>(
    api: &A,
    request: &ProvisionRequest,
    artifact: &ScanConfigArtifact,
) -> Result<ProvisionOutcome>
where
    A: SonarApi + ?Sized,
{
    provision_with(api, request, artifact, std::thread::sleep)
}

/// Ensures the project and a fresh token exist, then stores the token secret
/// in the scan configuration. The scan configuration is checked before any
/// service call so that no token is issued without a place to store it.
/// Token generation is retried at most once, after
/// a best-effort revoke and `request.retry_delay`.
pub fn provision_with<A, S>(
    api: &A,
    request: &ProvisionRequest,
    artifact: &ScanConfigArtifact,
    mut sleep: S,
) -> Result<ProvisionOutcome>
where
    A: SonarApi + ?Sized,
    S: FnMut(Duration),
{
    artifact.check()?;
    let creation = ensure_project(api, &request.project_key, &request.project_name)?;
    info!(project = %request.project_key, creation = creation.as_str(), "project ensured");

    let (token, token_attempts) = match try_generate_token(api, &request.token_name) {
        Ok(token) => (token, 1),
        Err(first) => {
            warn!(
                token = %request.token_name,
                status = ?first.status,
                "token generation failed; revoking and retrying once"
            );
            match api.revoke_token(&request.token_name) {
                Ok(response) => info!(status = response.status, "revoke attempted"),
                Err(err) => warn!(error = %err, "revoke request failed"),
            }
            sleep(request.retry_delay);
            let token = try_generate_token(api, &request.token_name)
                .map_err(|last| last.into_error(ProvisionStage::GenerateToken))?;
            (token, 2)
        }
    };
    info!(
        token = %token.name,
        prefix = %token.summary().secret_prefix,
        attempts = token_attempts,
        "token generated"
    );

    let token_write = artifact.write_token(token.secret())?;
    info!(path = %artifact.path.display(), mode = ?token_write, "scan configuration updated");

    Ok(ProvisionOutcome {
        project: ProjectResource {
            key: request.project_key.clone(),
            display_name: request.project_name.clone(),
        },
        creation,
        token,
        token_attempts,
        token_write,
        artifact: artifact.path.clone(),
    })
}

fn ensure_project<A>(api: &A, key: &str, name: &str) -> Result<ProjectCreation>
where
    A: SonarApi + ?Sized,
{
    let response = api
        .create_project(key, name)
        .map_err(|err| CallFailure::transport(&err).into_error(ProvisionStage::CreateProject))?;
    if response.is_success() {
        return Ok(ProjectCreation::Created);
    }
    if is_already_exists_response(&response) {
        return Ok(ProjectCreation::AlreadyExisted);
    }
    Err(CallFailure::from_response(&response).into_error(ProvisionStage::CreateProject))
}

/// Whether a failed create call only reports that the resource exists.
///
/// The service answers 400 with `{"errors":[{"msg":"... already exists ..."}]}`
/// and has no dedicated error code for it, so the message text is matched.
/// Bodies that are not the JSON error envelope fall back to a raw substring
/// check.
#[must_use]
pub fn is_already_exists_response(response: &ApiResponse) -> bool {
    if !matches!(response.status, 400 | 409) {
        return false;
    }
    match serde_json::from_str::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => envelope
            .errors
            .iter()
            .any(|error| mentions_existing(&error.msg)),
        Err(_) => mentions_existing(&response.body),
    }
}

fn mentions_existing(text: &str) -> bool {
    text.to_ascii_lowercase().contains(ALREADY_EXISTS_MARKER)
}

struct CallFailure {
    status: Option<u16>,
    body_excerpt: String,
}

impl CallFailure {
    fn from_response(response: &ApiResponse) -> Self {
        Self {
            status: Some(response.status),
            body_excerpt: body_excerpt(&response.body),
        }
    }

    fn transport(err: &SonarError) -> Self {
        Self {
            status: None,
            body_excerpt: body_excerpt(&err.to_string()),
        }
    }

    fn into_error(self, stage: ProvisionStage) -> SonarError {
        SonarError::Provision {
            stage,
            status: self.status,
            body_excerpt: self.body_excerpt,
        }
    }
}

fn try_generate_token<A>(api: &A, name: &str) -> std::result::Result<AuthToken, CallFailure>
where
    A: SonarApi + ?Sized,
{
    let response = api
        .generate_token(name)
        .map_err(|err| CallFailure::transport(&err))?;
    if response.status != 200 {
        return Err(CallFailure::from_response(&response));
    }
    let generated = response
        .decode::<GeneratedToken>()
        .map_err(|_| CallFailure::from_response(&response))?;
    let Some(secret) = generated.token.filter(|secret| !secret.trim().is_empty()) else {
        return Err(CallFailure {
            status: Some(response.status),
            body_excerpt: "response carried no token secret".to_string(),
        });
    };

    let created_at = generated
        .created_at
        .as_deref()
        .and_then(parse_service_timestamp)
        .unwrap_or_else(Utc::now);
    Ok(AuthToken::new(
        generated.name.unwrap_or_else(|| name.to_string()),
        secret,
        created_at,
    ))
}

/// Accepts RFC 3339 and the service's compact offset form
/// (`2024-05-01T10:00:00+0000`).
fn parse_service_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
