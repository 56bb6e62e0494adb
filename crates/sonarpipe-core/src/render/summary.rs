use super::{count_or_na, percent_or_na, write_line};
use crate::models::{QualityReport, Severity};

/// Compact summary in chat markup (`*bold*`), listing only non-empty
/// severities.
#[must_use]
pub fn format_chat_summary(report: &QualityReport) -> String {
    let status = report.quality_gate_status();
    let measures = report.measures();
    let mut out = String::new();
    write_line(
        &mut out,
        format_args!(
            "*Quality Gate:* {} ({}) for `{}`\n",
            status.label(),
            status.as_str(),
            report.project_key()
        ),
    );
    write_line(
        &mut out,
        format_args!("*Coverage:* {}\n", percent_or_na(measures.coverage_percent)),
    );
    write_line(&mut out, format_args!("*Bugs:* {}\n", count_or_na(measures.bugs)));
    write_line(
        &mut out,
        format_args!(
            "*Vulnerabilities:* {}\n",
            count_or_na(measures.vulnerabilities)
        ),
    );
    write_line(
        &mut out,
        format_args!("*Code Smells:* {}\n", count_or_na(measures.code_smells)),
    );
    write_line(
        &mut out,
        format_args!(
            "*Duplicated Lines:* {}\n",
            percent_or_na(measures.duplicated_lines_percent)
        ),
    );

    out.push_str("*Issues by Severity:*");
    if report.issues().is_empty() {
        out.push_str(" none\n");
        return out;
    }
    out.push('\n');
    for (severity, count) in report.issues_by_severity() {
        write_line(&mut out, format_args!("  - {severity}: {count}\n"));
    }
    out
}

/// Plain-text summary suitable for a mail body. Every severity is listed,
/// including zero counts.
#[must_use]
pub fn format_plain_summary(report: &QualityReport) -> String {
    let measures = report.measures();
    let mut out = String::new();
    write_line(
        &mut out,
        format_args!(
            "Quality Gate Status: {}\n",
            report.quality_gate_status().as_str()
        ),
    );
    write_line(&mut out, format_args!("Project: {}\n", report.project_key()));
    write_line(&mut out, format_args!("Generated: {}\n", report.generated_at()));
    out.push_str("\nMetrics:\n");
    write_line(
        &mut out,
        format_args!("  - Coverage: {}\n", percent_or_na(measures.coverage_percent)),
    );
    write_line(&mut out, format_args!("  - Bugs: {}\n", count_or_na(measures.bugs)));
    write_line(
        &mut out,
        format_args!(
            "  - Vulnerabilities: {}\n",
            count_or_na(measures.vulnerabilities)
        ),
    );
    write_line(
        &mut out,
        format_args!("  - Code Smells: {}\n", count_or_na(measures.code_smells)),
    );
    write_line(
        &mut out,
        format_args!(
            "  - Duplicated Lines: {}\n",
            percent_or_na(measures.duplicated_lines_percent)
        ),
    );
    write_line(
        &mut out,
        format_args!("  - Lines of Code: {}\n", count_or_na(measures.lines)),
    );
    out.push_str("\nIssues by Severity:\n");
    for severity in Severity::ALL {
        write_line(
            &mut out,
            format_args!("  - {severity}: {}\n", report.severity_count(severity)),
        );
    }
    out
}
