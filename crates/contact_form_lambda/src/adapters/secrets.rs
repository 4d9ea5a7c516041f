use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use contact_form_core::collaborators::SecretProvider;
use contact_form_core::{CollaboratorError, SecretBundle};

pub struct SecretsManagerProvider {
    secrets_client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerProvider {
    pub fn new(secrets_client: aws_sdk_secretsmanager::Client) -> Self {
        Self { secrets_client }
    }
}

#[async_trait]
impl SecretProvider for SecretsManagerProvider {
    async fn fetch(&self, secret_id: &str) -> Result<SecretBundle, CollaboratorError> {
        let output = self
            .secrets_client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|error| read_failure(secret_id, &error))?;
        decode_secret(secret_id, output.secret_string())
    }
}

/// Keeps the SDK error's source chain; its plain Display is only a category
/// such as "service error".
fn read_failure(secret_id: &str, error: &impl std::error::Error) -> CollaboratorError {
    CollaboratorError::new(format!(
        "failed to read secret {secret_id}: {}",
        DisplayErrorContext(error)
    ))
}

/// Binary secrets are not supported; the bundle must be a JSON string.
pub fn decode_secret(
    secret_id: &str,
    secret_string: Option<&str>,
) -> Result<SecretBundle, CollaboratorError> {
    let secret_string = secret_string.ok_or_else(|| {
        CollaboratorError::new(format!("secret {secret_id} has no string value"))
    })?;
    SecretBundle::from_secret_string(secret_string)
}
