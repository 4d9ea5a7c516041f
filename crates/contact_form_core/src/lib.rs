//! Contact form submission pipeline.
//!
//! This crate owns the request-processing pipeline: validation, captcha
//! outcome interpretation, email composition, send outcome interpretation,
//! and response shaping. It intentionally excludes AWS SDK and Lambda runtime
//! concerns; secret storage, captcha verification, and mail dispatch are
//! reached only through the traits in [`collaborators`].

pub mod captcha;
pub mod collaborators;
pub mod compose;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod response;
pub mod validation;

pub use contract::{ContactRequest, EmailMessage, MailAddresses, Response, SecretBundle};
pub use error::{CollaboratorError, PipelineError, StageError};
pub use pipeline::{
    Pipeline, PipelineBuilder, PipelineContext, PipelineRun, PipelineState, PlanError, Stage,
    StagePlan,
};
