use crate::collaborators::CaptchaBackend;
use crate::contract::{CaptchaPayload, InvocationOutcome, SecretBundle};
use crate::error::StageError;

pub async fn verify_captcha(
    backend: &dyn CaptchaBackend,
    token: &str,
    secrets: &SecretBundle,
) -> Result<(), StageError> {
    let payload = CaptchaPayload {
        recaptcha: token.to_string(),
        secret: secrets.captcha_secret.clone(),
    };
    let outcome = backend
        .verify(&payload)
        .await
        .map_err(StageError::CaptchaInvocation)?;
    interpret_captcha_outcome(&outcome)
}

/// An explicit error report wins over truthiness; a falsy outcome means the
/// verifier gave no positive answer.
pub fn interpret_captcha_outcome(outcome: &InvocationOutcome) -> Result<(), StageError> {
    if let Some(message) = outcome.error_indicator() {
        return Err(StageError::CaptchaReported(message));
    }
    if outcome.is_falsy() {
        return Err(StageError::CaptchaRejected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn truthy_outcome_passes() {
        let outcome = InvocationOutcome::new(json!({"success": true}));
        assert!(interpret_captcha_outcome(&outcome).is_ok());
    }

    #[test]
    fn falsy_outcome_is_rejected() {
        for value in [json!(null), json!(false), json!(0), json!("")] {
            let error = interpret_captcha_outcome(&InvocationOutcome::new(value))
                .expect_err("falsy outcome should fail");
            assert_eq!(error, StageError::CaptchaRejected);
        }
    }

    #[test]
    fn falsy_error_message_does_not_fail_a_positive_answer() {
        let outcome = InvocationOutcome::new(json!({"success": true, "errorMessage": false}));
        assert!(interpret_captcha_outcome(&outcome).is_ok());
    }

    #[test]
    fn reported_error_surfaces_its_text() {
        let outcome = InvocationOutcome::new(json!({"errorMessage": "timeout-or-duplicate"}));
        let error = interpret_captcha_outcome(&outcome).expect_err("report should fail");
        assert_eq!(error.to_string(), "timeout-or-duplicate");
        assert_eq!(error.status_code(), 500);
    }
}
