use std::sync::Arc;

use aws_config::SdkConfig;
use contact_form_core::{Pipeline, PlanError, Stage};

use crate::adapters::invoke::{AwsLambdaInvoker, InvokedCaptchaBackend, InvokedEmailSender};
use crate::adapters::secrets::SecretsManagerProvider;
use crate::config::ContactFormConfig;

/// Wires AWS-backed collaborators for the stages the configuration enables.
pub fn build_pipeline(
    config: &ContactFormConfig,
    aws_config: &SdkConfig,
) -> Result<Pipeline, PlanError> {
    let invoker = Arc::new(AwsLambdaInvoker::new(aws_sdk_lambda::Client::new(
        aws_config,
    )));
    let sender = Arc::new(InvokedEmailSender::new(
        invoker.clone(),
        config.send_email_function.clone(),
    ));

    let mut builder = Pipeline::builder(config.plan, config.addresses.clone(), sender);
    if config.plan.includes(Stage::FetchSecrets) {
        builder = builder.secret_provider(
            config.secret_id.clone(),
            Arc::new(SecretsManagerProvider::new(
                aws_sdk_secretsmanager::Client::new(aws_config),
            )),
        );
    }
    if let Some(function_name) = &config.captcha_function {
        builder = builder.captcha_backend(Arc::new(InvokedCaptchaBackend::new(
            invoker,
            function_name.clone(),
        )));
    }
    builder.build()
}
