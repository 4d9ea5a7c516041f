//! Stage orchestration for one submission.
//!
//! Stages run in a fixed order, one at a time, over a context owned by the
//! current invocation. The first failure is terminal; the response is built
//! exactly once from the terminal state.

use std::cell::OnceCell;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::captcha::verify_captcha;
use crate::collaborators::{CaptchaBackend, EmailSender, SecretProvider};
use crate::compose::compose_email;
use crate::contract::{
    ContactRequest, EmailMessage, InvocationOutcome, MailAddresses, Response, SecretBundle,
    DEFAULT_SECRET_ID,
};
use crate::dispatch::send_email;
use crate::error::{PipelineError, StageError};
use crate::response::build_response;
use crate::validation::{validate_submission, ValidationRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ValidateRequest,
    FetchSecrets,
    VerifyCaptcha,
    ComposeEmail,
    SendEmail,
}

impl Stage {
    pub const CANONICAL_ORDER: [Stage; 5] = [
        Stage::ValidateRequest,
        Stage::FetchSecrets,
        Stage::VerifyCaptcha,
        Stage::ComposeEmail,
        Stage::SendEmail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ValidateRequest => "request_validation",
            Self::FetchSecrets => "get_secrets",
            Self::VerifyCaptcha => "check_captcha",
            Self::ComposeEmail => "compose_email",
            Self::SendEmail => "send_email",
        }
    }

    fn completed_state(self) -> PipelineState {
        match self {
            Self::ValidateRequest => PipelineState::Validated,
            Self::FetchSecrets => PipelineState::SecretsFetched,
            Self::VerifyCaptcha => PipelineState::CaptchaVerified,
            Self::ComposeEmail => PipelineState::EmailComposed,
            Self::SendEmail => PipelineState::EmailSent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("unknown pipeline stage '{0}' (expected 'secrets', 'captcha' or 'none')")]
    UnknownStage(String),

    #[error("captcha verification requires the secret fetch stage")]
    CaptchaWithoutSecrets,

    #[error("stage '{0}' is enabled but no {1} was provided")]
    MissingCollaborator(&'static str, &'static str),
}

/// Which optional stages a deployment runs. Validation, composition and
/// sending are always part of the plan; the order never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    fetch_secrets: bool,
    verify_captcha: bool,
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::full()
    }
}

impl StagePlan {
    pub fn full() -> Self {
        Self {
            fetch_secrets: true,
            verify_captcha: true,
        }
    }

    pub fn minimal() -> Self {
        Self {
            fetch_secrets: false,
            verify_captcha: false,
        }
    }

    pub fn new(fetch_secrets: bool, verify_captcha: bool) -> Result<Self, PlanError> {
        if verify_captcha && !fetch_secrets {
            return Err(PlanError::CaptchaWithoutSecrets);
        }
        Ok(Self {
            fetch_secrets,
            verify_captcha,
        })
    }

    /// Parses a comma separated list of optional stages, e.g.
    /// `"secrets,captcha"`. `"none"` or an empty list selects the minimal plan.
    pub fn parse(list: &str) -> Result<Self, PlanError> {
        let mut fetch_secrets = false;
        let mut verify_captcha = false;
        for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            match entry.to_ascii_lowercase().as_str() {
                "secrets" => fetch_secrets = true,
                "captcha" => verify_captcha = true,
                "none" => {}
                _ => return Err(PlanError::UnknownStage(entry.to_string())),
            }
        }
        Self::new(fetch_secrets, verify_captcha)
    }

    pub fn includes(&self, stage: Stage) -> bool {
        match stage {
            Stage::FetchSecrets => self.fetch_secrets,
            Stage::VerifyCaptcha => self.verify_captcha,
            Stage::ValidateRequest | Stage::ComposeEmail | Stage::SendEmail => true,
        }
    }

    /// Enabled stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::CANONICAL_ORDER
            .into_iter()
            .filter(|stage| self.includes(*stage))
            .collect()
    }

    fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            require_recaptcha: self.verify_captcha,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Validated,
    SecretsFetched,
    CaptchaVerified,
    EmailComposed,
    EmailSent,
    Completed,
    Failed(PipelineError),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Per-invocation record threaded through the stages. Every slot is written
/// by exactly one stage and never reassigned.
#[derive(Debug)]
pub struct PipelineContext {
    raw: Value,
    request: OnceCell<ContactRequest>,
    secrets: OnceCell<SecretBundle>,
    captcha_verified: OnceCell<()>,
    email: OnceCell<EmailMessage>,
    send_confirmation: OnceCell<InvocationOutcome>,
}

impl PipelineContext {
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            request: OnceCell::new(),
            secrets: OnceCell::new(),
            captcha_verified: OnceCell::new(),
            email: OnceCell::new(),
            send_confirmation: OnceCell::new(),
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn request(&self) -> Option<&ContactRequest> {
        self.request.get()
    }

    pub fn secrets(&self) -> Option<&SecretBundle> {
        self.secrets.get()
    }

    pub fn captcha_verified(&self) -> bool {
        self.captcha_verified.get().is_some()
    }

    pub fn email(&self) -> Option<&EmailMessage> {
        self.email.get()
    }

    pub fn send_confirmation(&self) -> Option<&InvocationOutcome> {
        self.send_confirmation.get()
    }
}

fn write_once<T>(slot: &OnceCell<T>, value: T, field: &str) -> Result<(), PipelineError> {
    slot.set(value).map_err(|_| {
        PipelineError::new(
            format!("pipeline context field '{field}' was already written"),
            Some(500),
        )
    })
}

fn missing(field: &str) -> PipelineError {
    PipelineError::new(
        format!("pipeline context field '{field}' is not available"),
        Some(500),
    )
}

/// Terminal state, final context, and the response built from them.
#[derive(Debug)]
pub struct PipelineRun {
    pub state: PipelineState,
    pub context: PipelineContext,
    pub response: Response,
}

pub struct PipelineBuilder {
    plan: StagePlan,
    addresses: MailAddresses,
    secret_id: String,
    secret_provider: Option<Arc<dyn SecretProvider>>,
    captcha_backend: Option<Arc<dyn CaptchaBackend>>,
    email_sender: Arc<dyn EmailSender>,
}

impl PipelineBuilder {
    pub fn secret_provider(
        mut self,
        secret_id: impl Into<String>,
        provider: Arc<dyn SecretProvider>,
    ) -> Self {
        self.secret_id = secret_id.into();
        self.secret_provider = Some(provider);
        self
    }

    pub fn captcha_backend(mut self, backend: Arc<dyn CaptchaBackend>) -> Self {
        self.captcha_backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<Pipeline, PlanError> {
        if self.plan.includes(Stage::FetchSecrets) && self.secret_provider.is_none() {
            return Err(PlanError::MissingCollaborator(
                Stage::FetchSecrets.name(),
                "secret provider",
            ));
        }
        if self.plan.includes(Stage::VerifyCaptcha) && self.captcha_backend.is_none() {
            return Err(PlanError::MissingCollaborator(
                Stage::VerifyCaptcha.name(),
                "captcha backend",
            ));
        }
        Ok(Pipeline {
            plan: self.plan,
            addresses: self.addresses,
            secret_id: self.secret_id,
            secret_provider: self.secret_provider,
            captcha_backend: self.captcha_backend,
            email_sender: self.email_sender,
        })
    }
}

/// One orchestrator for every deployment variant; the [`StagePlan`] decides
/// whether secret fetch and captcha verification take part.
pub struct Pipeline {
    plan: StagePlan,
    addresses: MailAddresses,
    secret_id: String,
    secret_provider: Option<Arc<dyn SecretProvider>>,
    captcha_backend: Option<Arc<dyn CaptchaBackend>>,
    email_sender: Arc<dyn EmailSender>,
}

impl Pipeline {
    pub fn builder(
        plan: StagePlan,
        addresses: MailAddresses,
        email_sender: Arc<dyn EmailSender>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            plan,
            addresses,
            secret_id: DEFAULT_SECRET_ID.to_string(),
            secret_provider: None,
            captcha_backend: None,
            email_sender,
        }
    }

    pub fn plan(&self) -> StagePlan {
        self.plan
    }

    /// Processes one submission and returns the response for the caller.
    ///
    /// Not idempotent: submitting the same payload twice dispatches two
    /// messages.
    pub async fn run(&self, raw: Value) -> Response {
        self.run_traced(raw).await.response
    }

    pub async fn run_traced(&self, raw: Value) -> PipelineRun {
        let mut context = PipelineContext::new(raw);
        let mut state = PipelineState::Start;

        for stage in self.plan.stages() {
            info!(stage = stage.name(), "pipeline stage started");
            match self.run_stage(stage, &mut context).await {
                Ok(()) => state = stage.completed_state(),
                Err(error) => {
                    warn!(
                        stage = stage.name(),
                        status_code = error.status_code,
                        error = %error,
                        "pipeline stage failed"
                    );
                    state = PipelineState::Failed(error);
                    break;
                }
            }
        }

        if !state.is_terminal() {
            state = PipelineState::Completed;
        }

        let response = match &state {
            PipelineState::Failed(error) => build_response(Err(error)),
            _ => build_response(Ok(())),
        };
        let submission_fingerprint = context.request().map(ContactRequest::fingerprint);
        info!(
            status_code = response.status_code,
            submission_fingerprint = submission_fingerprint.as_deref(),
            "pipeline finished"
        );

        PipelineRun {
            state,
            context,
            response,
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        context: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        match stage {
            Stage::ValidateRequest => {
                let request = validate_submission(context.raw(), self.plan.validation_rules())
                    .map_err(StageError::Validation)?;
                info!(submission_fingerprint = %request.fingerprint(), "submission validated");
                write_once(&context.request, request, "request")
            }
            Stage::FetchSecrets => {
                let provider = self
                    .secret_provider
                    .as_deref()
                    .ok_or_else(|| missing("secret provider"))?;
                let secrets = provider
                    .fetch(&self.secret_id)
                    .await
                    .map_err(StageError::SecretFetch)?;
                write_once(&context.secrets, secrets, "secrets")
            }
            Stage::VerifyCaptcha => {
                let backend = self
                    .captcha_backend
                    .as_deref()
                    .ok_or_else(|| missing("captcha backend"))?;
                let request = context.request().ok_or_else(|| missing("request"))?;
                let secrets = context.secrets().ok_or_else(|| missing("secrets"))?;
                verify_captcha(backend, &request.recaptcha_token, secrets).await?;
                write_once(&context.captcha_verified, (), "captcha_verified")
            }
            Stage::ComposeEmail => {
                let request = context.request().ok_or_else(|| missing("request"))?;
                let email = compose_email(request, &self.addresses);
                write_once(&context.email, email, "email")
            }
            Stage::SendEmail => {
                let email = context.email().ok_or_else(|| missing("email"))?;
                let confirmation = send_email(self.email_sender.as_ref(), email).await?;
                write_once(&context.send_confirmation, confirmation, "send_confirmation")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_plan_runs_every_stage_in_order() {
        assert_eq!(StagePlan::full().stages(), Stage::CANONICAL_ORDER.to_vec());
    }

    #[test]
    fn minimal_plan_skips_optional_stages() {
        assert_eq!(
            StagePlan::minimal().stages(),
            vec![Stage::ValidateRequest, Stage::ComposeEmail, Stage::SendEmail]
        );
    }

    #[test]
    fn parse_accepts_optional_stage_lists() {
        assert_eq!(StagePlan::parse("secrets, captcha"), Ok(StagePlan::full()));
        assert_eq!(StagePlan::parse("none"), Ok(StagePlan::minimal()));
        assert_eq!(StagePlan::parse(""), Ok(StagePlan::minimal()));
        assert_eq!(
            StagePlan::parse("secrets").map(|plan| plan.stages()),
            Ok(vec![
                Stage::ValidateRequest,
                Stage::FetchSecrets,
                Stage::ComposeEmail,
                Stage::SendEmail
            ])
        );
    }

    #[test]
    fn parse_rejects_unknown_and_inconsistent_plans() {
        assert_eq!(
            StagePlan::parse("secrets,retry"),
            Err(PlanError::UnknownStage("retry".to_string()))
        );
        assert_eq!(
            StagePlan::parse("captcha"),
            Err(PlanError::CaptchaWithoutSecrets)
        );
    }

    #[test]
    fn context_slots_are_write_once() {
        let context = PipelineContext::new(Value::Null);
        write_once(&context.captcha_verified, (), "captcha_verified").expect("first write");
        let error = write_once(&context.captcha_verified, (), "captcha_verified")
            .expect_err("second write should fail");
        assert!(error.message.contains("already written"));
    }
}
