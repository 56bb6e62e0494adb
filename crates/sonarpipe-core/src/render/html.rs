use super::{count_or_na, percent_or_na, write_line};
use crate::models::{CodeContext, Issue, QualityGateStatus, QualityReport, Severity};
use crate::text::escape_html;

const STYLE: &str = "
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f5f5f5; color: #212121; }
main { max-width: 1100px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; }
.gate { color: #fff; padding: 8px 18px; border-radius: 4px; font-weight: bold; letter-spacing: 0.05em; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 12px; margin: 24px 0; }
.card { background: #fff; border-radius: 4px; padding: 16px; box-shadow: 0 1px 2px rgba(0,0,0,0.1); }
.card .value { font-size: 1.6em; font-weight: bold; }
.card .label { color: #757575; font-size: 0.85em; }
table { width: 100%; border-collapse: collapse; background: #fff; margin-bottom: 16px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e0e0e0; vertical-align: top; }
.badge { color: #fff; padding: 2px 8px; border-radius: 3px; font-size: 0.8em; font-weight: bold; }
pre.context { background: #263238; color: #eceff1; padding: 8px; margin: 6px 0 0; overflow-x: auto; font-size: 0.85em; }
pre.context .hit { background: #5d4037; display: block; }
.muted { color: #757575; }
";

#[must_use]
pub const fn gate_color(status: QualityGateStatus) -> &'static str {
    match status {
        QualityGateStatus::Ok => "#4CAF50",
        QualityGateStatus::Error => "#F44336",
        QualityGateStatus::Warn => "#FF9800",
        QualityGateStatus::Unknown => "#9E9E9E",
    }
}

#[must_use]
pub const fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Blocker => "#D32F2F",
        Severity::Critical => "#F44336",
        Severity::Major => "#FF9800",
        Severity::Minor => "#FFC107",
        Severity::Info => "#2196F3",
    }
}

/// Self-contained HTML document with inline styles and no external assets.
#[must_use]
pub fn render_html(report: &QualityReport) -> String {
    let mut out = String::new();
    let project = escape_html(report.project_key());
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    write_line(
        &mut out,
        format_args!("<title>Quality report: {project}</title>\n"),
    );
    write_line(&mut out, format_args!("<style>{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n<main>\n");

    write_header(&mut out, report, &project);
    write_conditions(&mut out, report);
    write_metric_cards(&mut out, report);
    write_severity_summary(&mut out, report);
    write_issue_groups(&mut out, report);

    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn write_header(out: &mut String, report: &QualityReport, project: &str) {
    let status = report.quality_gate_status();
    out.push_str("<header>\n");
    write_line(
        out,
        format_args!(
            "<div><h1>{project}</h1><div class=\"muted\">Generated {} &middot; snapshot {}</div></div>\n",
            escape_html(report.generated_at()),
            escape_html(report.snapshot_id()),
        ),
    );
    write_line(
        out,
        format_args!(
            "<div class=\"gate\" data-status=\"{}\" style=\"background: {}\">Quality Gate: {}</div>\n",
            status.as_str(),
            gate_color(status),
            status.label(),
        ),
    );
    out.push_str("</header>\n");
}

fn write_conditions(out: &mut String, report: &QualityReport) {
    let conditions = report.quality_gate_conditions();
    if conditions.is_empty() {
        return;
    }
    out.push_str("<h2>Gate conditions</h2>\n<table>\n");
    out.push_str("<tr><th>Metric</th><th>Status</th><th>Threshold</th><th>Actual</th></tr>\n");
    for condition in conditions {
        let threshold = match (&condition.comparator, &condition.error_threshold) {
            (Some(comparator), Some(threshold)) => format!("{comparator} {threshold}"),
            (None, Some(threshold)) => threshold.clone(),
            _ => "-".to_string(),
        };
        write_line(
            out,
            format_args!(
                "<tr><td>{}</td><td><span class=\"badge\" style=\"background: {}\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&condition.metric_key),
                gate_color(condition.status),
                condition.status.as_str(),
                escape_html(&threshold),
                escape_html(condition.actual_value.as_deref().unwrap_or("-")),
            ),
        );
    }
    out.push_str("</table>\n");
}

fn write_metric_cards(out: &mut String, report: &QualityReport) {
    let measures = report.measures();
    let cards = [
        ("coverage", "Coverage", percent_or_na(measures.coverage_percent)),
        ("bugs", "Bugs", count_or_na(measures.bugs)),
        (
            "vulnerabilities",
            "Vulnerabilities",
            count_or_na(measures.vulnerabilities),
        ),
        ("code-smells", "Code smells", count_or_na(measures.code_smells)),
        (
            "duplication",
            "Duplicated lines",
            percent_or_na(measures.duplicated_lines_percent),
        ),
        ("lines", "Lines of code", count_or_na(measures.lines)),
    ];

    out.push_str("<div class=\"cards\">\n");
    for (id, label, value) in cards {
        write_line(
            out,
            format_args!(
                "<div class=\"card\" id=\"metric-{id}\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>\n"
            ),
        );
    }
    out.push_str("</div>\n");
}

fn write_severity_summary(out: &mut String, report: &QualityReport) {
    out.push_str("<h2>Issues by severity</h2>\n<table>\n<tr><th>Severity</th><th>Count</th></tr>\n");
    for severity in Severity::ALL {
        write_line(
            out,
            format_args!(
                "<tr><td><span class=\"badge\" style=\"background: {}\">{severity}</span></td><td>{}</td></tr>\n",
                severity_color(severity),
                report.severity_count(severity),
            ),
        );
    }
    write_line(
        out,
        format_args!(
            "<tr><th>Total</th><th>{}</th></tr>\n</table>\n",
            report.issues().len()
        ),
    );
}

fn write_issue_groups(out: &mut String, report: &QualityReport) {
    out.push_str("<h2>Open issues</h2>\n");
    if report.issues().is_empty() {
        out.push_str("<p class=\"muted\">No open issues.</p>\n");
        return;
    }

    for severity in Severity::ALL {
        let mut issues = report.issues_with_severity(severity).peekable();
        if issues.peek().is_none() {
            continue;
        }
        let slug = severity.as_str().to_ascii_lowercase();
        write_line(
            out,
            format_args!(
                "<section class=\"severity-group\" id=\"severity-{slug}\">\n<h3><span class=\"badge\" style=\"background: {}\">{severity}</span> {}</h3>\n",
                severity_color(severity),
                report.severity_count(severity),
            ),
        );
        out.push_str(
            "<table>\n<tr><th>Location</th><th>Message</th><th>Rule</th><th>Type</th><th>Effort</th></tr>\n",
        );
        for issue in issues {
            write_issue_row(out, issue);
        }
        out.push_str("</table>\n</section>\n");
    }
}

fn write_issue_row(out: &mut String, issue: &Issue) {
    let location = match issue.line {
        Some(line) => format!("{}:{line}", issue.file),
        None => issue.file.clone(),
    };
    write_line(
        out,
        format_args!(
            "<tr><td>{}</td><td>{}",
            escape_html(&location),
            escape_html(&issue.message),
        ),
    );
    if let Some(context) = &issue.code_context {
        write_code_context(out, context);
    }
    write_line(
        out,
        format_args!(
            "</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&issue.rule),
            escape_html(issue.issue_type.as_deref().unwrap_or("-")),
            escape_html(issue.effort.as_deref().unwrap_or("-")),
        ),
    );
}

fn write_code_context(out: &mut String, context: &CodeContext) {
    out.push_str("<pre class=\"context\">");
    for line in &context.lines {
        let class = if line.is_issue_line { " class=\"hit\"" } else { "" };
        write_line(
            out,
            format_args!(
                "<span{class}>{:>4} | {}</span>\n",
                line.line,
                escape_html(&line.code)
            ),
        );
    }
    out.push_str("</pre>");
}
