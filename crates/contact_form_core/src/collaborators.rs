//! Capability traits for the external systems the pipeline consumes.
//!
//! Production adapters live in `contact_form_lambda`; tests substitute
//! deterministic doubles.

use async_trait::async_trait;

use crate::contract::{CaptchaPayload, EmailMessage, InvocationOutcome, SecretBundle};
use crate::error::CollaboratorError;

#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn fetch(&self, secret_id: &str) -> Result<SecretBundle, CollaboratorError>;
}

#[async_trait]
pub trait CaptchaBackend: Send + Sync {
    async fn verify(&self, payload: &CaptchaPayload)
        -> Result<InvocationOutcome, CollaboratorError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<InvocationOutcome, CollaboratorError>;
}
