use crate::contract::{cors_headers, Response, ResponseBody, SENT_MESSAGE};
use crate::error::PipelineError;

pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Maps the terminal pipeline state to the single response shape returned to
/// the caller. Total: every terminal state yields a response.
pub fn build_response(terminal: Result<(), &PipelineError>) -> Response {
    match terminal {
        Ok(()) => Response {
            status_code: 200,
            headers: cors_headers(),
            body: ResponseBody {
                message: SENT_MESSAGE.to_string(),
            },
        },
        Err(error) => Response {
            status_code: error.status_code.unwrap_or(DEFAULT_ERROR_STATUS),
            headers: cors_headers(),
            body: ResponseBody {
                message: error.message.clone(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::contract::{CORS_ALLOW_CREDENTIALS_HEADER, CORS_ALLOW_ORIGIN_HEADER};

    #[test]
    fn completed_pipeline_reports_sent() {
        let response = build_response(Ok(()));

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.message, "Sent");
        assert_eq!(response.headers[CORS_ALLOW_ORIGIN_HEADER], json!("*"));
        assert_eq!(response.headers[CORS_ALLOW_CREDENTIALS_HEADER], json!(true));
    }

    #[test]
    fn failure_keeps_status_and_message() {
        let error = PipelineError::bad_request("Text can't be blank");
        let response = build_response(Err(&error));

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body.message, "Text can't be blank");
        assert_eq!(response.headers.len(), 2);
    }

    #[test]
    fn failure_without_status_defaults_to_500() {
        let error = PipelineError::new("socket hang up", None);
        let response = build_response(Err(&error));
        assert_eq!(response.status_code, 500);
    }
}
