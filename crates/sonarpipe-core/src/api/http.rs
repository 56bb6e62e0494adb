use reqwest::blocking::{Client, RequestBuilder};
use tracing::debug;

use super::{
    ApiResponse, ISSUES_SEARCH_PATH, MEASURES_PATH, PROJECT_CREATE_PATH, QUALITY_GATE_PATH,
    SYSTEM_STATUS_PATH, SonarApi, TOKEN_GENERATE_PATH, TOKEN_REVOKE_PATH,
};
use crate::api::wire::SystemStatusResponse;
use crate::config::{Credentials, ServiceSettings};
use crate::error::Result;
use crate::models::ServiceStatus;

/// Blocking client for a service instance. Every request carries the
/// configured credentials and per-request timeout.
#[derive(Clone)]
pub struct HttpSonarApi {
    base_url: String,
    credentials: Credentials,
    http: Client,
}

impl std::fmt::Debug for HttpSonarApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSonarApi")
            .field("base_url", &self.base_url)
            .field("auth", &self.credentials.kind())
            .finish_non_exhaustive()
    }
}

impl HttpSonarApi {
    pub fn new(settings: &ServiceSettings) -> Result<Self> {
        let http = Client::builder().timeout(settings.http_timeout()).build()?;
        Ok(Self {
            base_url: settings.host.trim_end_matches('/').to_string(),
            credentials: settings.credentials.clone(),
            http,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Token(token) => request.basic_auth(token, Some("")),
            Credentials::Basic { user, password } => request.basic_auth(user, Some(password)),
        }
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse> {
        let request = self.authorized(self.http.get(self.url(path)).query(query));
        send(path, request)
    }

    fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let request = self.authorized(self.http.post(self.url(path)).form(form));
        send(path, request)
    }
}

fn send(path: &str, request: RequestBuilder) -> Result<ApiResponse> {
    let response = request.send()?;
    let status = response.status().as_u16();
    let body = response.text()?;
    debug!(endpoint = path, status, bytes = body.len(), "api response");
    Ok(ApiResponse::new(path, status, body))
}

impl SonarApi for HttpSonarApi {
    fn system_status(&self) -> ServiceStatus {
        // The status endpoint is public; credentials are not required here.
        let response = match self.http.get(self.url(SYSTEM_STATUS_PATH)).send() {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "status probe failed");
                return ServiceStatus::Unreachable;
            }
        };
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "status probe rejected");
            return ServiceStatus::Unreachable;
        }
        match response.json::<SystemStatusResponse>() {
            Ok(reported) => ServiceStatus::from_reported(&reported.status),
            Err(err) => {
                debug!(error = %err, "status probe returned an unreadable body");
                ServiceStatus::Unreachable
            }
        }
    }

    fn create_project(&self, key: &str, name: &str) -> Result<ApiResponse> {
        self.post(PROJECT_CREATE_PATH, &[("project", key), ("name", name)])
    }

    fn generate_token(&self, name: &str) -> Result<ApiResponse> {
        self.post(
            TOKEN_GENERATE_PATH,
            &[("name", name), ("type", "GLOBAL_ANALYSIS_TOKEN")],
        )
    }

    fn revoke_token(&self, name: &str) -> Result<ApiResponse> {
        self.post(TOKEN_REVOKE_PATH, &[("name", name)])
    }

    fn quality_gate(&self, project_key: &str) -> Result<ApiResponse> {
        self.get(QUALITY_GATE_PATH, &[("projectKey", project_key.to_string())])
    }

    fn measures(&self, project_key: &str, metric_keys: &[&str]) -> Result<ApiResponse> {
        self.get(
            MEASURES_PATH,
            &[
                ("component", project_key.to_string()),
                ("metricKeys", metric_keys.join(",")),
            ],
        )
    }

    fn issues_page(&self, project_key: &str, page: u32, page_size: u32) -> Result<ApiResponse> {
        self.get(
            ISSUES_SEARCH_PATH,
            &[
                ("componentKeys", project_key.to_string()),
                ("resolved", "false".to_string()),
                ("ps", page_size.to_string()),
                ("p", page.to_string()),
            ],
        )
    }
}
