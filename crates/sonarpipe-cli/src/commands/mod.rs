use anyhow::Result;
use sonarpipe_core::aggregate::{AggregateOptions, aggregate};
use sonarpipe_core::pipeline::{PipelineOptions, ReportArtifacts, run_pipeline};
use sonarpipe_core::provision::{ProvisionRequest, provision};
use sonarpipe_core::readiness::{ReadinessPolicy, wait_until_ready};
use sonarpipe_core::render::{
    ReportPaths, format_chat_summary, format_plain_summary, render, write_report,
};
use sonarpipe_core::scan::{ProcessScanRunner, ScanRunner, plan_scan, resolve_on_path};
use sonarpipe_core::scan_config::ScanConfigArtifact;
use sonarpipe_core::{HttpSonarApi, PipelineConfig, SonarApi, Stage};
use tracing::info;

use crate::cli::{Cli, Commands};

mod overrides;
mod support;

#[cfg(test)]
mod tests;

use self::support::{failure_at, print_json, stage_failure};

pub(crate) fn run(cli: Cli) -> Result<()> {
    let quiet = cli.global.quiet;
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Wait(_) => {
            let api = connect(&config, Stage::Readiness)?;
            let outcome = wait_for_service(&config, &api)?;
            print_json(&outcome)?;
        }
        Commands::Provision(_) => {
            let api = connect(&config, Stage::Readiness)?;
            wait_for_service(&config, &api)?;
            let artifact = ScanConfigArtifact::new(
                &config.scan.properties_file,
                &config.provision.placeholder,
                &config.provision.token_property,
            );
            let outcome = provision(&api, &ProvisionRequest::from_config(&config), &artifact)
                .map_err(stage_failure)?;
            print_json(&outcome.summary())?;
        }
        Commands::Scan(_) => {
            let command = plan_scan(&config, resolve_on_path);
            let invocation = ProcessScanRunner.run(&command).map_err(stage_failure)?;
            print_json(&invocation)?;
            invocation.ensure_success().map_err(stage_failure)?;
        }
        Commands::Report(_) => {
            let api = connect(&config, Stage::Aggregate)?;
            let report = aggregate(
                &api,
                &config.project.key,
                &AggregateOptions::from_config(&config),
            )
            .map_err(stage_failure)?;
            let paths = ReportPaths::from_config(&config);
            let rendered = render(&report).map_err(stage_failure)?;
            write_report(&rendered, &paths).map_err(stage_failure)?;
            if !quiet {
                eprintln!("{}", format_chat_summary(&report));
                eprintln!("{}", format_plain_summary(&report));
            }
            print_json(&ReportArtifacts::new(report, Some(paths)))?;
        }
        Commands::Run(args) => {
            let api = connect(&config, Stage::Readiness)?;
            let options = PipelineOptions {
                skip_provision: args.skip_provision,
                skip_scan: args.skip_scan,
            };
            let outcome =
                run_pipeline(&config, &api, &ProcessScanRunner, options).map_err(stage_failure)?;
            if !quiet && let Some(report) = &outcome.report {
                eprintln!("{}", format_chat_summary(&report.report));
            }
            print_json(&outcome)?;
        }
    }
    Ok(())
}

/// Defaults, config file and environment, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(cli.global.config.as_deref()).map_err(stage_failure)?;
    cli.global.apply(&mut config);
    match &cli.command {
        Commands::Wait(args) => args.apply(&mut config),
        Commands::Provision(args) => {
            args.wait.apply(&mut config);
            args.target.apply(&mut config);
            if let Some(path) = &args.properties_file {
                config.scan.properties_file.clone_from(path);
            }
        }
        Commands::Scan(args) => args.target.apply(&mut config),
        Commands::Report(args) => args.output.apply(&mut config),
        Commands::Run(args) => {
            args.wait.apply(&mut config);
            args.target.apply(&mut config);
            args.scan.apply(&mut config);
            args.output.apply(&mut config);
        }
    }
    config.validate().map_err(stage_failure)?;
    info!(
        host = %config.service.host,
        project = %config.project.key,
        auth = config.service.credentials.kind(),
        "configuration resolved"
    );
    Ok(config)
}

/// Builds the HTTP client; failures are reported under `stage`, the first
/// stage that would have used it.
fn connect(config: &PipelineConfig, stage: Stage) -> Result<HttpSonarApi> {
    HttpSonarApi::new(&config.service).map_err(failure_at(stage))
}

fn wait_for_service(
    config: &PipelineConfig,
    api: &HttpSonarApi,
) -> Result<sonarpipe_core::models::ReadyOutcome> {
    wait_until_ready(
        || api.system_status(),
        ReadinessPolicy::from_config(config),
    )
    .map_err(stage_failure)
}
