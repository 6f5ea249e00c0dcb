//! Multi-step submission wizard

pub mod controller;
pub mod registry;
pub mod state;
pub mod steps;

use crate::models::FieldErrors;
use thiserror::Error;

pub use controller::{Advance, Submission, WizardController, WizardSettings, WizardView};
pub use registry::WizardRegistry;
pub use steps::Step;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Please correct the highlighted fields")]
    Validation(FieldErrors),

    #[error("This manifestation has already been submitted")]
    AlreadySubmitted,

    #[error("The wizard session was closed")]
    Cancelled,

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Field '{0}' does not belong to the selected subject")]
    UnknownField(String),

    #[error("Select a subject first")]
    NoSubjectSelected,

    #[error("Attachment not found")]
    AttachmentNotFound,

    #[error("Another operation is in progress for this session")]
    Busy,

    #[error("Wizard session not found")]
    SessionNotFound,
}
