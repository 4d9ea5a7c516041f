use contact_form_lambda::config::ContactFormConfig;
use contact_form_lambda::handlers::contact::{handle_contact_event, ApiGatewayResponse};
use contact_form_lambda::runtime::build_pipeline;
use contact_form_lambda::telemetry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{info, info_span, Instrument};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let config = ContactFormConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let pipeline = build_pipeline(&config, &aws_config)?;
    info!(stages = ?config.plan.stages(), "contact form pipeline configured");

    let pipeline = &pipeline;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let span = info_span!("contact_request", request_id = %event.context.request_id);
        let response: ApiGatewayResponse = handle_contact_event(pipeline, event.payload)
            .instrument(span)
            .await;
        Ok::<_, Error>(response)
    }))
    .await
}
