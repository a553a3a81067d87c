use crate::engine::AuditOutcome;
use anyhow::Result;

pub fn render_json(outcome: &AuditOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

pub fn print_json(outcome: &AuditOutcome) -> Result<()> {
    println!("{}", render_json(outcome)?);
    Ok(())
}
