use thiserror::Error;

use crate::validation::ValidationReport;

/// Fixed message for a captcha backend that answered with a falsy outcome.
pub const CAPTCHA_REJECTED_MESSAGE: &str = "captcha verification failed";

/// Failure reported by an external collaborator (secret store, captcha
/// backend, mail backend). Only the message text survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything a stage can fail with. Composition has no variant: it cannot
/// fail on a validated request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("{0}")]
    SecretFetch(CollaboratorError),

    #[error("{0}")]
    CaptchaInvocation(CollaboratorError),

    #[error("{}", CAPTCHA_REJECTED_MESSAGE)]
    CaptchaRejected,

    #[error("{0}")]
    CaptchaReported(String),

    #[error("{0}")]
    EmailSend(CollaboratorError),

    #[error("{0}")]
    EmailReported(String),
}

impl StageError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::SecretFetch(_)
            | Self::CaptchaInvocation(_)
            | Self::CaptchaRejected
            | Self::CaptchaReported(_)
            | Self::EmailSend(_)
            | Self::EmailReported(_) => 500,
        }
    }
}

/// The only error shape that crosses a stage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl PipelineError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, Some(400))
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PipelineError {}

impl From<StageError> for PipelineError {
    fn from(error: StageError) -> Self {
        let status_code = error.status_code();
        Self::new(error.to_string(), Some(status_code))
    }
}
