//! Environment configuration for the contact form function.

use contact_form_core::contract::DEFAULT_SECRET_ID;
use contact_form_core::{MailAddresses, PlanError, Stage, StagePlan};
use thiserror::Error;

pub const PIPELINE_STAGES_VAR: &str = "PIPELINE_STAGES";
pub const SECRET_ID_VAR: &str = "CAPTCHA_SECRET_ID";
pub const CAPTCHA_FUNCTION_VAR: &str = "LAMBDA_RECAPTCHA";
pub const SEND_EMAIL_FUNCTION_VAR: &str = "LAMBDA_SEND_EMAIL";
pub const FROM_VAR: &str = "FROM";
pub const TO_VAR: &str = "TO";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    MissingEnvVar(&'static str),

    #[error("invalid PIPELINE_STAGES: {0}")]
    InvalidPlan(#[from] PlanError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormConfig {
    pub plan: StagePlan,
    pub secret_id: String,
    /// Only set when the plan verifies captchas.
    pub captcha_function: Option<String>,
    pub send_email_function: String,
    pub addresses: MailAddresses,
}

impl ContactFormConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| read(key).ok_or(ConfigError::MissingEnvVar(key));

        let plan = match read(PIPELINE_STAGES_VAR) {
            Some(list) => StagePlan::parse(&list)?,
            None => StagePlan::full(),
        };

        let captcha_function = if plan.includes(Stage::VerifyCaptcha) {
            Some(require(CAPTCHA_FUNCTION_VAR)?)
        } else {
            None
        };

        Ok(Self {
            plan,
            secret_id: read(SECRET_ID_VAR).unwrap_or_else(|| DEFAULT_SECRET_ID.to_string()),
            captcha_function,
            send_email_function: require(SEND_EMAIL_FUNCTION_VAR)?,
            addresses: MailAddresses {
                from: require(FROM_VAR)?,
                to: require(TO_VAR)?,
            },
        })
    }
}
