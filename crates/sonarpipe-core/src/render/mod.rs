//! Report serialization: JSON, HTML and short text summaries.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{Result, SonarError};
use crate::fs::{StagedFile, stage_file};
use crate::models::QualityReport;

mod html;
mod summary;

pub use html::render_html;
pub use summary::{format_chat_summary, format_plain_summary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub json: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

impl ReportPaths {
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            json: config.report.json_output.clone(),
            html: config.report.html_output.clone(),
        }
    }
}

/// Renders both documents in memory; nothing touches the filesystem.
pub fn render(report: &QualityReport) -> Result<RenderedReport> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(RenderedReport {
        json,
        html: render_html(report),
    })
}

/// Writes both documents, creating parent directories as needed. Both files
/// are staged before either is renamed into place, so a failure while writing
/// leaves neither document half-updated.
pub fn write_report(rendered: &RenderedReport, paths: &ReportPaths) -> Result<()> {
    let json = stage_document(&paths.json, &rendered.json)?;
    let html = stage_document(&paths.html, &rendered.html)?;
    commit_document(&paths.json, json)?;
    commit_document(&paths.html, html)?;
    info!(
        json = %paths.json.display(),
        html = %paths.html.display(),
        "report files written"
    );
    Ok(())
}

fn stage_document(path: &Path, content: &str) -> Result<StagedFile> {
    stage_file(path, content).map_err(|source| render_io(path, source))
}

fn commit_document(path: &Path, staged: StagedFile) -> Result<()> {
    staged.commit().map_err(|source| render_io(path, source))
}

fn render_io(path: &Path, source: std::io::Error) -> SonarError {
    SonarError::RenderIo {
        path: path.to_path_buf(),
        source,
    }
}

fn write_line(out: &mut String, args: std::fmt::Arguments<'_>) {
    let _ = out.write_fmt(args);
}

/// Measure display shared by the HTML and text renderers. Absent values
/// render as `N/A`.
fn percent_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| format!("{value:.1}%"))
}

fn count_or_na(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests;
