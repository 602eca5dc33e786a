//! Result vocabulary shared by tracks, sessions and spanning
//!
//! Every operation in this crate that can "succeed and ask to be called again"
//! or "not be ready yet" reports one of these codes instead of a plain bool.

use serde::{Deserialize, Serialize};

/// Outcome of a burn-session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurnResult {
    /// Operation completed, nothing more to do
    Ok,
    /// Operation failed; caller decides whether to abort or adjust parameters
    Error,
    /// Operation produced a unit of work; call again
    Retry,
    /// Transient state; poll later
    NotReady,
    /// Work is in progress on another execution context
    Running,
    /// Operation was cancelled
    Cancel,
    /// Operation may damage data if continued
    Dangerous,
    /// Medium must be reloaded before continuing
    NeedReload,
    /// Operation is not supported by this track or drive
    NotSupported,
}

impl BurnResult {
    pub fn is_ok(self) -> bool {
        self == BurnResult::Ok
    }

    pub fn is_error(self) -> bool {
        self == BurnResult::Error
    }

    /// True for the codes that mean "not finished yet but healthy"
    pub fn is_pending(self) -> bool {
        matches!(self, BurnResult::NotReady | BurnResult::Running)
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            BurnResult::Ok => "ok",
            BurnResult::Error => "error",
            BurnResult::Retry => "retry",
            BurnResult::NotReady => "not ready",
            BurnResult::Running => "running",
            BurnResult::Cancel => "cancelled",
            BurnResult::Dangerous => "dangerous",
            BurnResult::NeedReload => "need reload",
            BurnResult::NotSupported => "not supported",
        }
    }
}

impl std::fmt::Display for BurnResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_text())
    }
}

/// Readiness report for a track or a whole session
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub result: BurnResult,
    /// Completion fraction in `0.0..=1.0`, `None` when indeterminate
    pub progress: Option<f64>,
    /// Free-form description of what is being done
    pub current_action: Option<String>,
}

impl Status {
    /// Finished and ready to be burnt
    pub fn completed() -> Self {
        Self {
            result: BurnResult::Ok,
            progress: Some(1.0),
            current_action: None,
        }
    }

    pub fn not_ready(progress: Option<f64>, current_action: Option<String>) -> Self {
        Self {
            result: BurnResult::NotReady,
            progress,
            current_action,
        }
    }

    pub fn running(progress: Option<f64>, current_action: Option<String>) -> Self {
        Self {
            result: BurnResult::Running,
            progress,
            current_action,
        }
    }

    pub fn error(current_action: Option<String>) -> Self {
        Self {
            result: BurnResult::Error,
            progress: None,
            current_action,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::completed()
    }
}
