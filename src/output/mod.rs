mod cli;
mod json;

pub use cli::{print_cli_report, render_cli_report, DisplayOptions};
pub use json::{print_json, render_json};

use crate::engine::AuditOutcome;
use anyhow::Result;

/// Output format for audit results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables, badges and annotations for people and CI logs
    Table,
    /// The full outcome as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_outcome(outcome: &AuditOutcome, format: OutputFormat, display: &DisplayOptions) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_cli_report(outcome, display);
            Ok(())
        }
        OutputFormat::Json => print_json(outcome),
    }
}
