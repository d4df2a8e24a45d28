//! Observable submit-button state.

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

use super::form::{SubmissionError, SubmissionForm};

/// Primary request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonPhase {
    /// Ready for a new submission.
    #[default]
    Idle,
    /// A request is in flight; further submits are ignored.
    Pending,
}

/// Icon axis. It lags [`ButtonPhase`] so transitions can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonIcon {
    /// Resting icon.
    #[default]
    Arrows,
    /// Request in flight.
    Pending,
    /// Request succeeded.
    Check,
}

impl ButtonIcon {
    /// Button caption shown with this icon.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Arrows => "Import",
            Self::Pending => "Importing",
            Self::Check => "Imported",
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrows => "arrows",
            Self::Pending => "pending",
            Self::Check => "check",
        }
    }
}

impl Display for ButtonIcon {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// An icon change in progress; both ends are visible until it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconTransition {
    /// Outgoing icon.
    pub from: ButtonIcon,
    /// Incoming icon.
    pub to: ButtonIcon,
}

/// Everything a front-end needs to draw the submission form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionView {
    /// Request state.
    pub phase: ButtonPhase,
    /// Settled icon.
    pub icon: ButtonIcon,
    /// Icon change currently animating, if any.
    pub transition: Option<IconTransition>,
    /// Inline validation message under the URL field.
    pub url_error: Option<String>,
    /// Current form contents.
    pub form: SubmissionForm,
}

impl SubmissionView {
    /// Whether the form accepts edits and submits.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == ButtonPhase::Idle
    }

    /// Caption for the settled icon.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.icon.label()
    }
}

/// Result of one [`submit`](super::SubmissionController::submit) call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A submission was already pending.
    Ignored,
    /// Validation failed; the backend was not contacted.
    Rejected(SubmissionError),
    /// The backend accepted the torrent; carries its response body.
    Succeeded(Value),
    /// The request failed; carries the message rendered in the output panel.
    Failed(String),
    /// The panel was torn down mid-flow.
    Cancelled,
}
