use contact_form_core::response::build_response;
use contact_form_core::{Pipeline, PipelineError, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl From<Response> for ApiGatewayResponse {
    fn from(response: Response) -> Self {
        let mut headers: Map<String, Value> = response.headers.into_iter().collect();
        headers.insert("Content-Type".to_string(), json!("application/json"));
        Self {
            status_code: response.status_code,
            headers: Value::Object(headers),
            body: json!({ "message": response.body.message }).to_string(),
        }
    }
}

/// Accepts either the submission itself or an API Gateway proxy event
/// wrapping it, and runs it through the pipeline.
pub async fn handle_contact_event(pipeline: &Pipeline, event: Value) -> ApiGatewayResponse {
    let payload = match normalize_apigw_event(event) {
        Ok(value) => value,
        Err(message) => {
            return build_response(Err(&PipelineError::bad_request(message))).into();
        }
    };

    pipeline.run(payload).await.into()
}

fn normalize_apigw_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}
