//! Pipeline configuration.
//!
//! One immutable [`PipelineConfig`] value is built per run and borrowed by every
//! stage. Layers, lowest priority first: built-in defaults, an optional TOML
//! file, the process environment, then whatever the caller sets explicitly
//! (the CLI applies its flags last and calls [`PipelineConfig::validate`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SonarError};

mod env;
mod file;

pub use env::{
    HTTP_TIMEOUT_MS_ENV, READY_ATTEMPTS_ENV, READY_INTERVAL_SECS_ENV, SONAR_HOST_ENV,
    SONAR_PASSWORD_ENV, SONAR_PROJECT_KEY_ENV, SONAR_PROJECT_NAME_ENV, SONAR_TOKEN_ENV,
    SONAR_USER_ENV,
};

use self::env::EnvLookup;
use self::file::ConfigFile;

pub const DEFAULT_HOST: &str = "http://localhost:9000";
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
pub const DEFAULT_PROJECT_KEY: &str = "sample-project";
pub const DEFAULT_TOKEN_NAME: &str = "local-scan-token";
pub const DEFAULT_TOKEN_PLACEHOLDER: &str = "<TOKEN_PLACEHOLDER>";
pub const DEFAULT_TOKEN_PROPERTY: &str = "sonar.token";
pub const DEFAULT_SCANNER_EXECUTABLE: &str = "sonar-scanner";
pub const DEFAULT_SCANNER_IMAGE: &str = "sonarsource/sonar-scanner-cli";
/// Largest page size the issues search endpoint accepts.
pub const MAX_ISSUES_PAGE_SIZE: u32 = 500;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// User token, sent as the basic-auth user name with an empty password.
    Token(String),
    Basic { user: String, password: String },
}

impl Credentials {
    #[must_use]
    pub fn admin_default() -> Self {
        Self::Basic {
            user: DEFAULT_ADMIN_USER.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::Basic { .. } => "basic",
        }
    }

    /// Basic credentials keeping the current user or password where the
    /// override is absent. A token falls back to the local admin defaults.
    #[must_use]
    pub fn merge_basic(&self, user: Option<String>, password: Option<String>) -> Self {
        let (current_user, current_password) = match self {
            Self::Basic { user, password } => (user.clone(), password.clone()),
            Self::Token(_) => (
                DEFAULT_ADMIN_USER.to_string(),
                DEFAULT_ADMIN_PASSWORD.to_string(),
            ),
        };
        Self::Basic {
            user: user.unwrap_or(current_user),
            password: password.unwrap_or(current_password),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub host: String,
    pub credentials: Credentials,
    pub http_timeout_ms: u64,
}

impl ServiceSettings {
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub key: String,
    pub name: String,
    pub token_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub max_attempts: u32,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    pub retry_delay_ms: u64,
    pub placeholder: String,
    pub token_property: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub properties_file: PathBuf,
    pub project_dir: PathBuf,
    pub scanner_executable: String,
    pub container_image: String,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub json_output: PathBuf,
    pub html_output: PathBuf,
    pub source_root: Option<PathBuf>,
    pub issues_page_size: u32,
    pub max_issue_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub service: ServiceSettings,
    pub project: ProjectSettings,
    pub readiness: ReadinessSettings,
    pub provision: ProvisionSettings,
    pub scan: ScanSettings,
    pub report: ReportSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings {
                host: DEFAULT_HOST.to_string(),
                credentials: Credentials::admin_default(),
                http_timeout_ms: 10_000,
            },
            project: ProjectSettings {
                key: DEFAULT_PROJECT_KEY.to_string(),
                name: DEFAULT_PROJECT_KEY.to_string(),
                token_name: DEFAULT_TOKEN_NAME.to_string(),
            },
            readiness: ReadinessSettings {
                max_attempts: 60,
                interval_secs: 2,
            },
            provision: ProvisionSettings {
                retry_delay_ms: 1_000,
                placeholder: DEFAULT_TOKEN_PLACEHOLDER.to_string(),
                token_property: DEFAULT_TOKEN_PROPERTY.to_string(),
            },
            scan: ScanSettings {
                properties_file: PathBuf::from("sample-project/sonar-project.properties"),
                project_dir: PathBuf::from("sample-project"),
                scanner_executable: DEFAULT_SCANNER_EXECUTABLE.to_string(),
                container_image: DEFAULT_SCANNER_IMAGE.to_string(),
                extra_args: Vec::new(),
            },
            report: ReportSettings {
                json_output: PathBuf::from("report.json"),
                html_output: PathBuf::from("report.html"),
                source_root: None,
                issues_page_size: MAX_ISSUES_PAGE_SIZE,
                max_issue_pages: 20,
            },
        }
    }
}

impl PipelineConfig {
    /// Defaults, then `path` when given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    SonarError::Config(format!("cannot read {}: {err}", path.display()))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_with(&|name: &str| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file = toml::from_str::<ConfigFile>(raw)?;
        let mut config = Self::default();
        config.apply_file(file);
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            service,
            project,
            readiness,
            provision,
            scan,
            report,
        } = file;

        if let Some(host) = service.host {
            self.set_host(&host);
        }
        if let Some(token) = service.token {
            self.service.credentials = Credentials::Token(token);
        } else if service.user.is_some() || service.password.is_some() {
            self.service.credentials = self
                .service
                .credentials
                .merge_basic(service.user, service.password);
        }
        if let Some(timeout) = service.http_timeout_ms {
            self.service.http_timeout_ms = timeout;
        }

        if let Some(key) = project.key {
            self.set_project_key(key);
        }
        if let Some(name) = project.name {
            self.project.name = name;
        }
        if let Some(token_name) = project.token_name {
            self.project.token_name = token_name;
        }

        if let Some(max_attempts) = readiness.max_attempts {
            self.readiness.max_attempts = max_attempts;
        }
        if let Some(interval_secs) = readiness.interval_secs {
            self.readiness.interval_secs = interval_secs;
        }

        if let Some(delay) = provision.retry_delay_ms {
            self.provision.retry_delay_ms = delay;
        }
        if let Some(placeholder) = provision.placeholder {
            self.provision.placeholder = placeholder;
        }
        if let Some(property) = provision.token_property {
            self.provision.token_property = property;
        }

        if let Some(path) = scan.properties_file {
            self.scan.properties_file = path;
        }
        if let Some(dir) = scan.project_dir {
            self.scan.project_dir = dir;
        }
        if let Some(executable) = scan.scanner_executable {
            self.scan.scanner_executable = executable;
        }
        if let Some(image) = scan.container_image {
            self.scan.container_image = image;
        }
        if let Some(args) = scan.extra_args {
            self.scan.extra_args = args;
        }

        if let Some(path) = report.json_output {
            self.report.json_output = path;
        }
        if let Some(path) = report.html_output {
            self.report.html_output = path;
        }
        if report.source_root.is_some() {
            self.report.source_root = report.source_root;
        }
        if let Some(size) = report.issues_page_size {
            self.report.issues_page_size = size;
        }
        if let Some(pages) = report.max_issue_pages {
            self.report.max_issue_pages = pages;
        }
    }

    fn apply_env_with(&mut self, lookup: &dyn EnvLookup) {
        if let Some(host) = lookup.non_empty(SONAR_HOST_ENV) {
            self.set_host(&host);
        }
        if let Some(token) = lookup.non_empty(SONAR_TOKEN_ENV) {
            self.service.credentials = Credentials::Token(token);
        } else {
            let user = lookup.non_empty(SONAR_USER_ENV);
            let password = lookup.raw(SONAR_PASSWORD_ENV);
            if user.is_some() || password.is_some() {
                self.service.credentials = self.service.credentials.merge_basic(user, password);
            }
        }
        if let Some(timeout) = lookup.u64_value(HTTP_TIMEOUT_MS_ENV) {
            self.service.http_timeout_ms = timeout;
        }
        if let Some(key) = lookup.non_empty(SONAR_PROJECT_KEY_ENV) {
            self.set_project_key(key);
        }
        if let Some(name) = lookup.non_empty(SONAR_PROJECT_NAME_ENV) {
            self.project.name = name;
        }
        if let Some(attempts) = lookup.u32_at_least(READY_ATTEMPTS_ENV, 1) {
            self.readiness.max_attempts = attempts;
        }
        if let Some(interval) = lookup.u64_value(READY_INTERVAL_SECS_ENV) {
            self.readiness.interval_secs = interval;
        }
    }

    pub fn set_host(&mut self, host: &str) {
        self.service.host = normalize_host(host);
    }

    /// Sets the project key. The display name follows the key while it still
    /// mirrors the previous key.
    pub fn set_project_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.project.name == self.project.key {
            self.project.name.clone_from(&key);
        }
        self.project.key = key;
    }

    pub fn validate(&self) -> Result<()> {
        let host = self.service.host.as_str();
        if host.is_empty() {
            return Err(SonarError::Config("service host cannot be empty".to_string()));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(SonarError::Config(format!(
                "service host must start with http:// or https://, got '{host}'"
            )));
        }
        if self.service.http_timeout_ms == 0 {
            return Err(SonarError::Config("http timeout must be > 0".to_string()));
        }
        let key = self.project.key.as_str();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(SonarError::Config(format!(
                "project key must be non-empty without whitespace, got '{key}'"
            )));
        }
        if self.project.token_name.trim().is_empty() {
            return Err(SonarError::Config("token name cannot be empty".to_string()));
        }
        if self.readiness.max_attempts == 0 {
            return Err(SonarError::Config(
                "readiness max attempts must be >= 1".to_string(),
            ));
        }
        if self.provision.placeholder.is_empty() {
            return Err(SonarError::Config(
                "token placeholder cannot be empty".to_string(),
            ));
        }
        let page_size = self.report.issues_page_size;
        if page_size == 0 || page_size > MAX_ISSUES_PAGE_SIZE {
            return Err(SonarError::Config(format!(
                "issues page size must be within [1, {MAX_ISSUES_PAGE_SIZE}], got {page_size}"
            )));
        }
        if self.report.max_issue_pages == 0 {
            return Err(SonarError::Config("max issue pages must be >= 1".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.readiness.interval_secs)
    }

    #[must_use]
    pub const fn provision_retry_delay(&self) -> Duration {
        Duration::from_millis(self.provision.retry_delay_ms)
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests;
