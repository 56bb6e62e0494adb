//! Command-line values layered over the loaded configuration.

use sonarpipe_core::config::{Credentials, PipelineConfig};

use crate::cli::{
    GlobalArgs, ProvisionTargetArgs, ReportOutputArgs, ScanTargetArgs, WaitArgs,
};

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

impl GlobalArgs {
    pub(crate) fn apply(&self, config: &mut PipelineConfig) {
        if let Some(host) = non_empty(self.host.as_ref()) {
            config.set_host(&host);
        }
        if let Some(token) = non_empty(self.token.as_ref()) {
            config.service.credentials = Credentials::Token(token);
        } else if self.user.is_some() || self.password.is_some() {
            config.service.credentials = config
                .service
                .credentials
                .merge_basic(non_empty(self.user.as_ref()), self.password.clone());
        }
        if let Some(project) = non_empty(self.project.as_ref()) {
            config.set_project_key(project);
        }
    }
}

impl WaitArgs {
    pub(crate) fn apply(&self, config: &mut PipelineConfig) {
        if let Some(max_attempts) = self.max_attempts {
            config.readiness.max_attempts = max_attempts;
        }
        if let Some(interval_secs) = self.interval_secs {
            config.readiness.interval_secs = interval_secs;
        }
    }
}

impl ProvisionTargetArgs {
    pub(crate) fn apply(&self, config: &mut PipelineConfig) {
        if let Some(name) = non_empty(self.project_name.as_ref()) {
            config.project.name = name;
        }
        if let Some(token_name) = non_empty(self.token_name.as_ref()) {
            config.project.token_name = token_name;
        }
    }
}

impl ScanTargetArgs {
    pub(crate) fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.project_dir {
            config.scan.project_dir.clone_from(dir);
        }
        if let Some(path) = &self.properties_file {
            config.scan.properties_file.clone_from(path);
        }
        if let Some(scanner) = non_empty(self.scanner.as_ref()) {
            config.scan.scanner_executable = scanner;
        }
        if let Some(image) = non_empty(self.image.as_ref()) {
            config.scan.container_image = image;
        }
    }
}

impl ReportOutputArgs {
    pub(crate) fn apply(&self, config: &mut PipelineConfig) {
        if let Some(path) = &self.json_output {
            config.report.json_output.clone_from(path);
        }
        if let Some(path) = &self.html_output {
            config.report.html_output.clone_from(path);
        }
        if self.source_root.is_some() {
            config.report.source_root.clone_from(&self.source_root);
        }
        if let Some(page_size) = self.page_size {
            config.report.issues_page_size = page_size;
        }
    }
}
