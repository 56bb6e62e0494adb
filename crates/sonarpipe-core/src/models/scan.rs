use serde::{Deserialize, Serialize};

use crate::error::{Result, SonarError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    Local,
    Container,
}

impl ScanMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Container => "container",
        }
    }
}

/// Outcome of one scanner process. Exit code `-1` marks a process that was
/// terminated by a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanInvocation {
    pub command: Vec<String>,
    pub mode: ScanMode,
    pub exit_code: i32,
    pub duration_seconds: f64,
}

impl ScanInvocation {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    pub fn ensure_success(&self) -> Result<()> {
        if self.succeeded() {
            return Ok(());
        }
        Err(SonarError::ScanFailure {
            exit_code: Some(self.exit_code),
            command: self.command_line(),
        })
    }
}
