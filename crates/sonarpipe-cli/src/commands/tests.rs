use std::fs;
use std::path::PathBuf;

use clap::Parser;
use sonarpipe_core::config::Credentials;
use sonarpipe_core::{SonarError, Stage};
use tempfile::tempdir;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
}

#[test]
fn flags_override_config_file_values() {
    let temp = tempdir().expect("tempdir");
    let config_path = temp.path().join("sonarpipe.toml");
    fs::write(
        &config_path,
        "[project]\nkey = \"from-file\"\n\n[readiness]\nmax_attempts = 7\ninterval_secs = 5\n",
    )
    .expect("write config");
    let config_arg = config_path.to_str().expect("utf8 path");

    let cli = parse(&[
        "sonarpipe",
        "--config",
        config_arg,
        "--project",
        "from-flag",
        "wait",
        "--max-attempts",
        "2",
    ]);
    let config = resolve_config(&cli).expect("resolve");

    assert_eq!(config.project.key, "from-flag");
    assert_eq!(config.readiness.max_attempts, 2);
    assert_eq!(config.readiness.interval_secs, 5);
}

#[test]
fn token_flag_wins_over_basic_credentials() {
    let cli = parse(&[
        "sonarpipe",
        "--token",
        "squ_flag",
        "--user",
        "someone",
        "wait",
    ]);
    let config = resolve_config(&cli).expect("resolve");
    assert_eq!(
        config.service.credentials,
        Credentials::Token("squ_flag".to_string())
    );
}

#[test]
fn run_flags_reach_every_stage() {
    let cli = parse(&[
        "sonarpipe",
        "--project",
        "billing",
        "run",
        "--project-name",
        "Billing Service",
        "--project-dir",
        "services/billing",
        "--image",
        "registry.local/scanner:5",
        "--html-output",
        "out/billing.html",
        "--source-root",
        "services/billing",
    ]);
    let config = resolve_config(&cli).expect("resolve");

    assert_eq!(config.project.key, "billing");
    assert_eq!(config.project.name, "Billing Service");
    assert_eq!(config.scan.project_dir, PathBuf::from("services/billing"));
    assert_eq!(config.scan.container_image, "registry.local/scanner:5");
    assert_eq!(config.report.html_output, PathBuf::from("out/billing.html"));
    assert_eq!(config.report.json_output, PathBuf::from("report.json"));
    assert_eq!(
        config.report.source_root,
        Some(PathBuf::from("services/billing"))
    );
}

#[test]
fn invalid_config_file_is_reported_as_config_failure() {
    let temp = tempdir().expect("tempdir");
    let config_path = temp.path().join("broken.toml");
    fs::write(&config_path, "[project]\nkey = \"has space\"\n").expect("write config");

    let cli = parse(&[
        "sonarpipe",
        "--config",
        config_path.to_str().expect("utf8 path"),
        "wait",
    ]);
    let err = resolve_config(&cli).expect_err("invalid key");
    assert!(err.to_string().starts_with("config failed:"));
}

#[test]
fn client_setup_errors_are_reported_under_the_calling_stage() {
    let err = SonarError::Decode {
        endpoint: "client".to_string(),
        message: "bad certificate bundle".to_string(),
    };
    assert_eq!(err.stage(), Stage::Aggregate);

    let reported = support::failure_at(Stage::Readiness)(err);
    assert!(reported.to_string().starts_with("readiness failed:"));
}
