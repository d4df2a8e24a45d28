//! Submission Controller: form, button state machine and the submit flow.

mod controller;
mod form;
mod state;

pub use controller::SubmissionController;
pub use form::{SubmissionError, SubmissionForm};
pub use state::{ButtonIcon, ButtonPhase, IconTransition, SubmissionView, SubmitOutcome};
