use crate::error::AuditFetchError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Runs `npm audit --json` inside the project directory.
pub struct NpmAudit {
    program: String,
}

impl NpmAudit {
    pub fn new() -> Self {
        let program = if cfg!(target_os = "windows") { "npm.cmd" } else { "npm" };
        Self::with_program(program)
    }

    /// Uses a different executable, e.g. a wrapper script or a pinned npm.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command_line(&self) -> String {
        format!("{} audit --json", self.program)
    }
}

impl Default for NpmAudit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::AuditSource for NpmAudit {
    fn name(&self) -> &'static str {
        "npm audit"
    }

    async fn fetch(&self, project: &Path) -> Result<String, AuditFetchError> {
        debug!("Running {} in {}", self.command_line(), project.display());

        let output = Command::new(&self.program)
            .args(["audit", "--json"])
            .current_dir(project)
            .output()
            .await
            .map_err(|source| AuditFetchError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        // npm audit exits 1 whenever it finds vulnerabilities
        if !output.status.success() {
            return Err(AuditFetchError::Exited {
                command: self.command_line(),
                status: output.status.to_string(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(stdout)
    }
}

/// Reads a previously saved `npm audit --json` report.
pub struct FileAudit {
    path: PathBuf,
}

impl FileAudit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl super::AuditSource for FileAudit {
    fn name(&self) -> &'static str {
        "saved audit report"
    }

    async fn fetch(&self, project: &Path) -> Result<String, AuditFetchError> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            project.join(&self.path)
        };

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AuditFetchError::Read { path, source })
    }
}
