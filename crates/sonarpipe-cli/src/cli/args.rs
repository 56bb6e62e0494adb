use std::path::PathBuf;

use clap::Args;

use super::parsers::{parse_host, parse_min_one_u32, parse_page_size};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "SONAR_HOST", value_parser = parse_host)]
    pub host: Option<String>,

    #[arg(long, global = true, env = "SONAR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Basic-auth user; ignored when a token is given.
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Project key used for provisioning, scanning and reporting.
    #[arg(long, global = true, env = "SONAR_PROJECT_KEY")]
    pub project: Option<String>,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct WaitArgs {
    #[arg(long, value_parser = parse_min_one_u32)]
    pub max_attempts: Option<u32>,

    #[arg(long)]
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProvisionTargetArgs {
    #[arg(long)]
    pub project_name: Option<String>,

    #[arg(long)]
    pub token_name: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub wait: WaitArgs,

    #[command(flatten)]
    pub target: ProvisionTargetArgs,

    #[arg(long)]
    pub properties_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanTargetArgs {
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    #[arg(long)]
    pub properties_file: Option<PathBuf>,

    #[arg(long)]
    pub scanner: Option<String>,

    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: ScanTargetArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ReportOutputArgs {
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    #[arg(long)]
    pub html_output: Option<PathBuf>,

    /// Local checkout used to attach source lines around each issue.
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub output: ReportOutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub wait: WaitArgs,

    #[command(flatten)]
    pub target: ProvisionTargetArgs,

    #[command(flatten)]
    pub scan: ScanTargetArgs,

    #[command(flatten)]
    pub output: ReportOutputArgs,

    /// Use the token already stored in the scanner properties file.
    #[arg(long)]
    pub skip_provision: bool,

    /// Report on the latest existing analysis without scanning.
    #[arg(long)]
    pub skip_scan: bool,
}
