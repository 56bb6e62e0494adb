use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Starting,
    Up,
    Unreachable,
}

impl ServiceStatus {
    /// Maps the status word reported by `/api/system/status`. Only `UP` means
    /// operational; every other reported word is a startup phase.
    #[must_use]
    pub fn from_reported(word: &str) -> Self {
        if word.trim().eq_ignore_ascii_case("UP") {
            Self::Up
        } else {
            Self::Starting
        }
    }

    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "STARTING",
            Self::Up => "UP",
            Self::Unreachable => "UNREACHABLE",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyOutcome {
    pub attempts: u32,
}
