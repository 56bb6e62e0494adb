//! Access to the analysis service's web API.
//!
//! [`SonarApi`] returns raw status/body pairs so that callers decide what a
//! non-2xx answer means for their stage (an "already exists" 400 is success to
//! the provisioner, a 404 is "never analyzed" to the aggregator). Bodies are
//! decoded into the typed shapes in [`wire`].

use serde::de::DeserializeOwned;

use crate::error::{Result, SonarError};
use crate::models::ServiceStatus;
use crate::text::body_excerpt;

mod http;
#[cfg(test)]
pub(crate) mod scripted;
pub mod wire;

pub use self::http::HttpSonarApi;

pub const SYSTEM_STATUS_PATH: &str = "/api/system/status";
pub const PROJECT_CREATE_PATH: &str = "/api/projects/create";
pub const TOKEN_GENERATE_PATH: &str = "/api/user_tokens/generate";
pub const TOKEN_REVOKE_PATH: &str = "/api/user_tokens/revoke";
pub const QUALITY_GATE_PATH: &str = "/api/qualitygates/project_status";
pub const MEASURES_PATH: &str = "/api/measures/component";
pub const ISSUES_SEARCH_PATH: &str = "/api/issues/search";

/// One HTTP answer, kept undecoded until the caller knows what it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub endpoint: String,
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str::<T>(&self.body).map_err(|err| SonarError::Decode {
            endpoint: self.endpoint.clone(),
            message: err.to_string(),
        })
    }

    /// Decodes a 2xx body, mapping any other status to [`SonarError::Fetch`].
    pub fn expect_success<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.is_success() {
            return Err(self.to_fetch_error());
        }
        self.decode()
    }

    #[must_use]
    pub fn to_fetch_error(&self) -> SonarError {
        SonarError::Fetch {
            endpoint: self.endpoint.clone(),
            status: self.status,
            body_excerpt: body_excerpt(&self.body),
        }
    }
}

pub trait SonarApi {
    /// Probes the health endpoint. Never fails: transport errors and non-2xx
    /// answers are reported as [`ServiceStatus::Unreachable`].
    fn system_status(&self) -> ServiceStatus;

    fn create_project(&self, key: &str, name: &str) -> Result<ApiResponse>;

    fn generate_token(&self, name: &str) -> Result<ApiResponse>;

    fn revoke_token(&self, name: &str) -> Result<ApiResponse>;

    fn quality_gate(&self, project_key: &str) -> Result<ApiResponse>;

    fn measures(&self, project_key: &str, metric_keys: &[&str]) -> Result<ApiResponse>;

    /// One page of unresolved issues. `page` is 1-based.
    fn issues_page(&self, project_key: &str, page: u32, page_size: u32) -> Result<ApiResponse>;
}

impl<T: SonarApi + ?Sized> SonarApi for &T {
    fn system_status(&self) -> ServiceStatus {
        (**self).system_status()
    }

    fn create_project(&self, key: &str, name: &str) -> Result<ApiResponse> {
        (**self).create_project(key, name)
    }

    fn generate_token(&self, name: &str) -> Result<ApiResponse> {
        (**self).generate_token(name)
    }

    fn revoke_token(&self, name: &str) -> Result<ApiResponse> {
        (**self).revoke_token(name)
    }

    fn quality_gate(&self, project_key: &str) -> Result<ApiResponse> {
        (**self).quality_gate(project_key)
    }

    fn measures(&self, project_key: &str, metric_keys: &[&str]) -> Result<ApiResponse> {
        (**self).measures(project_key, metric_keys)
    }

    fn issues_page(&self, project_key: &str, page: u32, page_size: u32) -> Result<ApiResponse> {
        (**self).issues_page(project_key, page, page_size)
    }
}
