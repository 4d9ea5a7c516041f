#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contact_form_core::collaborators::{CaptchaBackend, EmailSender, SecretProvider};
use contact_form_core::contract::{CaptchaPayload, InvocationOutcome};
use contact_form_core::{
    CollaboratorError, EmailMessage, MailAddresses, Pipeline, SecretBundle, StagePlan,
};
use serde_json::{json, Value};

pub struct StubSecrets {
    result: Result<SecretBundle, CollaboratorError>,
    requested_ids: Mutex<Vec<String>>,
}

impl StubSecrets {
    pub fn returning(secret: &str) -> Self {
        Self {
            result: Ok(SecretBundle {
                captcha_secret: secret.to_string(),
            }),
            requested_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(CollaboratorError::new(message)),
            requested_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_ids(&self) -> Vec<String> {
        self.requested_ids.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl SecretProvider for StubSecrets {
    async fn fetch(&self, secret_id: &str) -> Result<SecretBundle, CollaboratorError> {
        self.requested_ids
            .lock()
            .expect("poisoned mutex")
            .push(secret_id.to_string());
        self.result.clone()
    }
}

pub struct ScriptedCaptcha {
    result: Result<InvocationOutcome, CollaboratorError>,
    payloads: Mutex<Vec<CaptchaPayload>>,
}

impl ScriptedCaptcha {
    pub fn answering(outcome: Value) -> Self {
        Self {
            result: Ok(InvocationOutcome::new(outcome)),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(CollaboratorError::new(message)),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<CaptchaPayload> {
        self.payloads.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl CaptchaBackend for ScriptedCaptcha {
    async fn verify(
        &self,
        payload: &CaptchaPayload,
    ) -> Result<InvocationOutcome, CollaboratorError> {
        self.payloads
            .lock()
            .expect("poisoned mutex")
            .push(payload.clone());
        self.result.clone()
    }
}

pub struct RecordingSender {
    result: Result<InvocationOutcome, CollaboratorError>,
    delay: Option<Duration>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingSender {
    pub fn accepting() -> Self {
        Self::answering(json!({"MessageId": "0100-abc"}))
    }

    pub fn answering(outcome: Value) -> Self {
        Self {
            result: Ok(InvocationOutcome::new(outcome)),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(CollaboratorError::new(message)),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, message: &EmailMessage) -> Result<InvocationOutcome, CollaboratorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .expect("poisoned mutex")
            .push(message.clone());
        self.result.clone()
    }
}

pub fn addresses() -> MailAddresses {
    MailAddresses {
        from: "Contact form <noreply@site.test>".to_string(),
        to: "office@site.test".to_string(),
    }
}

pub fn valid_submission(from: &str) -> Value {
    json!({
        "from": from,
        "text": "I would like a quote.",
        "html": "<p>I would like a quote.</p>",
        "recaptcha": "challenge-token"
    })
}

pub fn full_pipeline(
    secrets: Arc<StubSecrets>,
    captcha: Arc<ScriptedCaptcha>,
    sender: Arc<RecordingSender>,
) -> Pipeline {
    Pipeline::builder(StagePlan::full(), addresses(), sender)
        .secret_provider("reCaptcha_home", secrets)
        .captcha_backend(captcha)
        .build()
        .expect("full plan should build")
}
