mod report;
mod resources;
mod scan;
mod service;

pub use report::{
    CodeContext, CodeLine, GateCondition, Issue, ProjectMeasures, QualityGate, QualityGateStatus,
    QualityReport, QualityReportParts, Severity, SeverityCounts,
};
pub use resources::{AuthToken, AuthTokenSummary, ProjectCreation, ProjectResource};
pub use scan::{ScanInvocation, ScanMode};
pub use service::{ReadyOutcome, ServiceStatus};
