use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{AggregateOptions, aggregate};
use crate::api::SonarApi;
use crate::config::PipelineConfig;
use crate::error::{Result, SonarError, Stage};
use crate::models::{QualityGateStatus, QualityReport, ReadyOutcome, ScanInvocation, SeverityCounts};
use crate::provision::{ProvisionRequest, ProvisionSummary, provision_with};
use crate::readiness::{ReadinessPolicy, wait_until_ready_with};
use crate::render::{ReportPaths, render, write_report};
use crate::scan::{ScanRunner, plan_scan, resolve_on_path};
use crate::scan_config::ScanConfigArtifact;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Reuse the token already present in the scan configuration.
    pub skip_provision: bool,
    pub skip_scan: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineWarning {
    pub stage: Stage,
    pub code: String,
    pub message: String,
}

impl PipelineWarning {
    fn from_error(stage: Stage, err: &SonarError) -> Self {
        Self {
            stage,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Aggregated report plus where it was written. `written` is `None` when
/// rendering or writing failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportArtifacts {
    pub project_key: String,
    pub snapshot_id: String,
    pub quality_gate_status: QualityGateStatus,
    pub issues_by_severity: SeverityCounts,
    pub total_issues: usize,
    pub written: Option<ReportPaths>,
    #[serde(skip)]
    pub report: QualityReport,
}

impl ReportArtifacts {
    #[must_use]
    pub fn new(report: QualityReport, written: Option<ReportPaths>) -> Self {
        Self {
            project_key: report.project_key().to_string(),
            snapshot_id: report.snapshot_id().to_string(),
            quality_gate_status: report.quality_gate_status(),
            issues_by_severity: report.issues_by_severity().clone(),
            total_issues: report.issues().len(),
            written,
            report,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub readiness: ReadyOutcome,
    pub provision: Option<ProvisionSummary>,
    pub scan: Option<ScanInvocation>,
    pub report: Option<ReportArtifacts>,
    pub warnings: Vec<PipelineWarning>,
}

pub fn run_pipeline<A, R>(
    config: &PipelineConfig,
    api: &A,
    scanner: &R,
    options: PipelineOptions,
) -> Result<PipelineOutcome>
where
    A: SonarApi + ?Sized,
    R: ScanRunner + ?Sized,
{
    run_pipeline_with(config, api, scanner, options, std::thread::sleep)
}

/// Readiness, provisioning, scan, aggregation and rendering in order.
/// Readiness, provisioning and scan failures abort the run. Aggregation and
/// render failures are recorded as warnings and the run still succeeds.
pub fn run_pipeline_with<A, R, S>(
    config: &PipelineConfig,
    api: &A,
    scanner: &R,
    options: PipelineOptions,
    mut sleep: S,
) -> Result<PipelineOutcome>
where
    A: SonarApi + ?Sized,
    R: ScanRunner + ?Sized,
    S: FnMut(Duration),
{
    info!(project = %config.project.key, host = %config.service.host, "pipeline started");
    let readiness = wait_until_ready_with(
        || api.system_status(),
        ReadinessPolicy::from_config(config),
        &mut sleep,
    )?;

    let provision = if options.skip_provision {
        info!("provisioning skipped");
        None
    } else {
        let artifact = ScanConfigArtifact::new(
            &config.scan.properties_file,
            &config.provision.placeholder,
            &config.provision.token_property,
        );
        let outcome = provision_with(
            api,
            &ProvisionRequest::from_config(config),
            &artifact,
            &mut sleep,
        )?;
        Some(outcome.summary())
    };

    let scan = if options.skip_scan {
        info!("scan skipped");
        None
    } else {
        let command = plan_scan(config, resolve_on_path);
        let invocation = scanner.run(&command)?;
        invocation.ensure_success()?;
        Some(invocation)
    };

    let mut warnings = Vec::new();
    let report = report_stage(config, api, &mut warnings);
    for warning in &warnings {
        warn!(stage = %warning.stage, code = %warning.code, "{}", warning.message);
    }
    info!(warnings = warnings.len(), "pipeline finished");

    Ok(PipelineOutcome {
        readiness,
        provision,
        scan,
        report,
        warnings,
    })
}

fn report_stage<A>(
    config: &PipelineConfig,
    api: &A,
    warnings: &mut Vec<PipelineWarning>,
) -> Option<ReportArtifacts>
where
    A: SonarApi + ?Sized,
{
    let report = match aggregate(
        api,
        &config.project.key,
        &AggregateOptions::from_config(config),
    ) {
        Ok(report) => report,
        Err(err) => {
            warnings.push(PipelineWarning::from_error(Stage::Aggregate, &err));
            return None;
        }
    };

    let paths = ReportPaths::from_config(config);
    let written = match render(&report).and_then(|rendered| write_report(&rendered, &paths)) {
        Ok(()) => Some(paths),
        Err(err) => {
            warnings.push(PipelineWarning::from_error(Stage::Render, &err));
            None
        }
    };
    Some(ReportArtifacts::new(report, written))
}
