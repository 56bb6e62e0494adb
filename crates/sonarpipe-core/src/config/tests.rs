use std::collections::HashMap;
use std::path::PathBuf;

use super::*;

fn table(entries: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map = entries
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect::<HashMap<_, _>>();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn defaults_target_a_local_instance() {
    let config = PipelineConfig::default();
    assert_eq!(config.service.host, "http://localhost:9000");
    assert_eq!(config.service.credentials, Credentials::admin_default());
    assert_eq!(config.project.key, "sample-project");
    assert_eq!(config.project.token_name, "local-scan-token");
    assert_eq!(config.readiness.max_attempts, 60);
    assert_eq!(config.readiness_interval(), Duration::from_secs(2));
    assert_eq!(config.provision_retry_delay(), Duration::from_secs(1));
    assert_eq!(config.report.issues_page_size, 500);
    config.validate().expect("defaults validate");
}

#[test]
fn toml_file_overrides_defaults_per_field() {
    let config = PipelineConfig::from_toml_str(
        r#"
[service]
host = "http://sonar.internal:9000/"
token = "squ_file"

[project]
key = "billing"

[readiness]
max_attempts = 5

[report]
json_output = "out/quality.json"
source_root = "src"
"#,
    )
    .expect("parse config");

    assert_eq!(config.service.host, "http://sonar.internal:9000");
    assert_eq!(
        config.service.credentials,
        Credentials::Token("squ_file".to_string())
    );
    assert_eq!(config.project.key, "billing");
    assert_eq!(config.project.name, "billing");
    assert_eq!(config.readiness.max_attempts, 5);
    assert_eq!(config.readiness.interval_secs, 2);
    assert_eq!(config.report.json_output, PathBuf::from("out/quality.json"));
    assert_eq!(config.report.html_output, PathBuf::from("report.html"));
    assert_eq!(config.report.source_root, Some(PathBuf::from("src")));
}

#[test]
fn toml_file_rejects_unknown_keys() {
    let err = PipelineConfig::from_toml_str("[service]\nhots = \"x\"\n").expect_err("must fail");
    assert_eq!(err.code(), "TOML_ERROR");
}

#[test]
fn environment_overrides_file_values() {
    let mut config =
        PipelineConfig::from_toml_str("[project]\nkey = \"from-file\"\n").expect("parse");
    config.apply_env_with(&table(&[
        (SONAR_HOST_ENV, "https://sonar.example.com/"),
        (SONAR_TOKEN_ENV, "squ_env"),
        (SONAR_PROJECT_KEY_ENV, "from-env"),
        (READY_ATTEMPTS_ENV, "0"),
        (READY_INTERVAL_SECS_ENV, "1"),
    ]));

    assert_eq!(config.service.host, "https://sonar.example.com");
    assert_eq!(
        config.service.credentials,
        Credentials::Token("squ_env".to_string())
    );
    assert_eq!(config.project.key, "from-env");
    assert_eq!(config.project.name, "from-env");
    // zero attempts from the environment is ignored rather than accepted
    assert_eq!(config.readiness.max_attempts, 60);
    assert_eq!(config.readiness.interval_secs, 1);
}

#[test]
fn basic_credentials_merge_partial_environment() {
    let mut config = PipelineConfig::default();
    config.apply_env_with(&table(&[(SONAR_PASSWORD_ENV, "s3cret")]));
    assert_eq!(
        config.service.credentials,
        Credentials::Basic {
            user: "admin".to_string(),
            password: "s3cret".to_string(),
        }
    );
}

#[test]
fn explicit_project_name_survives_key_change() {
    let mut config = PipelineConfig::default();
    config.project.name = "Sample Project".to_string();
    config.set_project_key("renamed");
    assert_eq!(config.project.key, "renamed");
    assert_eq!(config.project.name, "Sample Project");
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut config = PipelineConfig::default();
    config.readiness.max_attempts = 0;
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.set_host("localhost:9000");
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.set_project_key("has space");
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.report.issues_page_size = 501;
    let err = config.validate().expect_err("page size");
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn credentials_debug_hides_secrets() {
    let rendered = format!(
        "{:?} {:?}",
        Credentials::Token("squ_secret".to_string()),
        Credentials::admin_default()
    );
    assert!(!rendered.contains("squ_secret"));
    assert!(rendered.contains("admin"));
    assert!(!rendered.contains("password: \"admin\""));
}
