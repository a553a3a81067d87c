use crate::engine::AuditOutcome;
use crate::model::{Severity, Vulnerability};
use tabled::{
    settings::{object::Columns, Style, Width},
    Table, Tabled,
};

/// Advisory summaries shown per package.
const MAX_DETAILS: usize = 3;
const DETAILS_WIDTH: usize = 80;

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Tabled)]
struct OutdatedRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Latest Version")]
    latest: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Rows below this severity are left out of the vulnerability table.
    pub min_severity: Severity,
    /// Colour severity cells with ANSI escapes.
    pub color: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            min_severity: Severity::None,
            color: false,
        }
    }
}

pub fn print_cli_report(outcome: &AuditOutcome, display: &DisplayOptions) {
    print!("{}", render_cli_report(outcome, display));
    if let Some(message) = failure_message(outcome) {
        eprintln!();
        eprintln!("{}", message);
    }
}

/// Renders everything that goes to stdout for the table format.
pub fn render_cli_report(outcome: &AuditOutcome, display: &DisplayOptions) -> String {
    let mut lines = vulnerability_lines(&outcome.vulnerabilities, display);

    lines.push(String::new());
    lines.push("Dependency status badges (use the badge URLs in your README or docs):".to_string());
    lines.push(format!("  Dependencies: {}", outcome.dependencies_badge.url()));
    lines.push(format!("  Vulnerabilities: {}", outcome.vulnerabilities_badge.url()));

    lines.push(String::new());
    if outcome.outdated.is_empty() {
        lines.push("All dependencies are up to date.".to_string());
    } else {
        let rows: Vec<OutdatedRow> = outcome
            .outdated
            .iter()
            .map(|(package, latest)| OutdatedRow {
                package: package.clone(),
                latest: latest.clone(),
            })
            .collect();
        lines.push("Outdated Packages:".to_string());
        lines.push(Table::new(rows).with(Style::rounded()).to_string());
    }

    lines.extend(outcome.annotations.iter().map(ToString::to_string));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn vulnerability_lines(vulnerabilities: &[Vulnerability], display: &DisplayOptions) -> Vec<String> {
    let mut lines = vec![String::new()];
    if vulnerabilities.is_empty() {
        lines.push("No vulnerabilities found!".to_string());
        return lines;
    }

    let shown: Vec<&Vulnerability> = vulnerabilities
        .iter()
        .filter(|v| v.severity >= display.min_severity)
        .collect();

    if shown.is_empty() {
        lines.push(format!(
            "No vulnerabilities at or above {} severity ({} below).",
            display.min_severity,
            vulnerabilities.len()
        ));
        return lines;
    }

    let rows: Vec<VulnRow> = shown
        .iter()
        .map(|v| VulnRow {
            package: v.name.clone(),
            severity: format_severity(v.severity, display.color),
            details: format_details(v),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::single(2), Width::wrap(DETAILS_WIDTH));
    lines.push("Vulnerabilities:".to_string());
    lines.push(table.to_string());

    let hidden = vulnerabilities.len() - shown.len();
    if hidden > 0 {
        lines.push(format!(
            "{} more below {} severity not shown.",
            hidden, display.min_severity
        ));
    }
    lines
}

fn format_details(vulnerability: &Vulnerability) -> String {
    let summaries = vulnerability.advisory_summaries(MAX_DETAILS);
    if summaries.is_empty() {
        "-".to_string()
    } else {
        summaries.join(" • ")
    }
}

fn format_severity(severity: Severity, color: bool) -> String {
    let label = severity.as_str().to_uppercase();
    if !color {
        return label;
    }
    match severity {
        Severity::Critical => format!("\x1b[41;97m{}\x1b[0m", label),
        Severity::High => format!("\x1b[31m{}\x1b[0m", label),
        Severity::Moderate => format!("\x1b[38;5;208m{}\x1b[0m", label),
        Severity::Low => format!("\x1b[33m{}\x1b[0m", label),
        Severity::None => label,
    }
}

/// Message for stderr when the outcome failed the run.
pub fn failure_message(outcome: &AuditOutcome) -> Option<String> {
    if !outcome.failed {
        return None;
    }
    let headline = match outcome.fail_on {
        Severity::High => "High/Critical vulnerabilities found.".to_string(),
        Severity::Critical => "Critical vulnerabilities found.".to_string(),
        threshold => format!("Vulnerabilities at or above {} severity found.", threshold),
    };
    let packages: Vec<&str> = outcome.blocking().map(|v| v.name.as_str()).collect();
    Some(format!("{}\nBlocking packages: {}", headline, packages.join(", ")))
}
