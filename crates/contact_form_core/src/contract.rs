use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::CollaboratorError;

pub const EMAIL_SUBJECT: &str = "From contact page";
pub const SENT_MESSAGE: &str = "Sent";
pub const DEFAULT_SECRET_ID: &str = "reCaptcha_home";

pub const CORS_ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";
pub const CORS_ALLOW_CREDENTIALS_HEADER: &str = "Access-Control-Allow-Credentials";

/// A submission that passed validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRequest {
    pub from: String,
    pub text: String,
    #[serde(default)]
    pub html: String,
    #[serde(rename = "recaptcha", default)]
    pub recaptcha_token: String,
}

impl ContactRequest {
    /// Short stable digest of the submission, used to correlate log lines
    /// without writing the submitter's address to the logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.from.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.text.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretBundle {
    #[serde(rename = "SECRET")]
    pub captcha_secret: String,
}

impl SecretBundle {
    pub fn from_secret_string(secret_string: &str) -> Result<Self, CollaboratorError> {
        serde_json::from_str(secret_string)
            .map_err(|error| CollaboratorError::new(format!("malformed secret bundle: {error}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptchaPayload {
    pub recaptcha: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailAddresses {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub reply_to: String,
    pub html: String,
    pub text: String,
}

/// Whatever a collaborator invocation handed back, kept as raw JSON.
///
/// Collaborators are other functions that answer with loosely shaped
/// documents, so interpretation follows JavaScript truthiness: `null`,
/// `false`, `0` and `""` are falsy, and an object carrying a non-empty
/// `errorMessage` is an explicit failure report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InvocationOutcome(Value);

impl InvocationOutcome {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn empty() -> Self {
        Self(Value::Null)
    }

    /// Decodes a raw invocation payload. An empty payload means the callee
    /// returned nothing.
    pub fn from_payload(bytes: &[u8]) -> Result<Self, CollaboratorError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|error| CollaboratorError::new(format!("malformed invocation payload: {error}")))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn is_falsy(&self) -> bool {
        is_falsy_value(&self.0)
    }

    /// Only a truthy `errorMessage` counts as a report.
    pub fn error_indicator(&self) -> Option<String> {
        match self.0.get("errorMessage")? {
            value if is_falsy_value(value) => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn is_falsy_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseBody {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, Value>,
    pub body: ResponseBody,
}

pub fn cors_headers() -> BTreeMap<String, Value> {
    BTreeMap::from([
        (CORS_ALLOW_ORIGIN_HEADER.to_string(), json!("*")),
        (CORS_ALLOW_CREDENTIALS_HEADER.to_string(), json!(true)),
    ])
}
