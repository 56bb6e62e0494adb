// Public fallible APIs in this crate share one concrete error contract (`SonarError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod fs;
pub mod models;
pub mod pipeline;
pub mod provision;
pub mod readiness;
pub mod render;
pub mod scan;
pub mod scan_config;
pub(crate) mod text;

pub use aggregate::{AggregateOptions, aggregate};
pub use api::{HttpSonarApi, SonarApi};
pub use config::{Credentials, PipelineConfig};
pub use error::{Result, SonarError, Stage};
pub use pipeline::{PipelineOptions, PipelineOutcome, run_pipeline};
pub use provision::{ProvisionRequest, provision};
pub use readiness::{ReadinessPolicy, wait_until_ready};
pub use render::{ReportPaths, render, write_report};
pub use scan::{ProcessScanRunner, ScanRunner, plan_scan};
pub use scan_config::ScanConfigArtifact;
