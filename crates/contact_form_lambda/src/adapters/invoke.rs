use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::types::InvocationType;
use contact_form_core::collaborators::{CaptchaBackend, EmailSender};
use contact_form_core::contract::{CaptchaPayload, InvocationOutcome};
use contact_form_core::{CollaboratorError, EmailMessage};
use serde::Serialize;

/// Raw answer of a synchronous function invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeReply {
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvokeReply, CollaboratorError>;
}

pub struct AwsLambdaInvoker {
    lambda_client: aws_sdk_lambda::Client,
}

impl AwsLambdaInvoker {
    pub fn new(lambda_client: aws_sdk_lambda::Client) -> Self {
        Self { lambda_client }
    }
}

#[async_trait]
impl FunctionInvoker for AwsLambdaInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvokeReply, CollaboratorError> {
        let output = self
            .lambda_client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .set_payload(Some(payload.into()))
            .send()
            .await
            .map_err(|error| invoke_failure(function_name, &error))?;

        Ok(InvokeReply {
            function_error: output.function_error().map(str::to_string),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        })
    }
}

fn invoke_failure(function_name: &str, error: &impl std::error::Error) -> CollaboratorError {
    CollaboratorError::new(format!(
        "failed to invoke {function_name}: {}",
        DisplayErrorContext(error)
    ))
}

/// Turns a reply into an outcome. A function error without an `errorMessage`
/// in its payload is still reported as a failure.
pub fn decode_reply(
    function_name: &str,
    reply: InvokeReply,
) -> Result<InvocationOutcome, CollaboratorError> {
    let outcome = InvocationOutcome::from_payload(&reply.payload)?;
    match reply.function_error {
        Some(kind) if outcome.error_indicator().is_none() => Err(CollaboratorError::new(
            format!("{function_name} failed with {kind}"),
        )),
        _ => Ok(outcome),
    }
}

async fn invoke_json(
    invoker: &dyn FunctionInvoker,
    function_name: &str,
    payload: &impl Serialize,
) -> Result<InvocationOutcome, CollaboratorError> {
    let body = serde_json::to_vec(payload).map_err(|error| {
        CollaboratorError::new(format!("failed to serialize {function_name} payload: {error}"))
    })?;
    let reply = invoker.invoke(function_name, body).await?;
    decode_reply(function_name, reply)
}

/// Captcha verification delegated to a separate function.
pub struct InvokedCaptchaBackend {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: String,
}

impl InvokedCaptchaBackend {
    pub fn new(invoker: Arc<dyn FunctionInvoker>, function_name: impl Into<String>) -> Self {
        Self {
            invoker,
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl CaptchaBackend for InvokedCaptchaBackend {
    async fn verify(
        &self,
        payload: &CaptchaPayload,
    ) -> Result<InvocationOutcome, CollaboratorError> {
        invoke_json(self.invoker.as_ref(), &self.function_name, payload).await
    }
}

/// Mail dispatch delegated to a separate function.
pub struct InvokedEmailSender {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: String,
}

impl InvokedEmailSender {
    pub fn new(invoker: Arc<dyn FunctionInvoker>, function_name: impl Into<String>) -> Self {
        Self {
            invoker,
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl EmailSender for InvokedEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<InvocationOutcome, CollaboratorError> {
        invoke_json(self.invoker.as_ref(), &self.function_name, message).await
    }
}
