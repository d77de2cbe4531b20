use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::HandlerError;

pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiGatewayResponse {
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// A successful outcome before CORS headers and body encoding are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status_code: u16,
    pub body: Option<Value>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: None,
        }
    }

    pub fn json(status_code: u16, payload: impl Serialize) -> Result<Self, HandlerError> {
        Ok(Self {
            status_code,
            body: Some(serde_json::to_value(payload)?),
        })
    }
}

/// Converts a handler outcome into the API Gateway response, logging
/// server-side failures.
pub fn respond(outcome: Result<Reply, HandlerError>, origin: &str) -> ApiGatewayResponse {
    let (status_code, body) = match outcome {
        Ok(reply) => (reply.status_code, reply.body),
        Err(error) => {
            let status_code = error.status_code();
            if status_code >= 500 {
                tracing::error!(error = %error, "request failed");
            } else {
                tracing::info!(status_code, error = %error, "request rejected");
            }
            let body = match error {
                HandlerError::MethodNotAllowed => None,
                other => Some(json!({"error": other.to_string()})),
            };
            (status_code, body)
        }
    };

    ApiGatewayResponse {
        status_code,
        headers: cors_headers(origin),
        body: body.map(|value| value.to_string()),
    }
}

fn cors_headers(origin: &str) -> Value {
    let mut headers = Map::new();
    headers.insert(ALLOW_ORIGIN_HEADER.to_string(), Value::from(origin));
    Value::Object(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document_store::StoreError;

    #[test]
    fn empty_ok_reply_has_no_body() {
        let response = respond(Ok(Reply::ok()), "*");

        assert_eq!(response.status_code, 200);
        assert!(response.body.is_none());
        assert_eq!(response.headers[ALLOW_ORIGIN_HEADER], "*");
        let encoded = serde_json::to_value(&response).expect("response should serialize");
        assert!(encoded.get("body").is_none());
        assert_eq!(encoded["statusCode"], 200);
    }

    #[test]
    fn errors_are_wrapped_in_error_field() {
        let response = respond(Err(HandlerError::MissingUuid), "https://openhouse.example");

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json_body(),
            Some(json!({"error": "Missing UUID in URL path"}))
        );
        assert_eq!(
            response.headers[ALLOW_ORIGIN_HEADER],
            "https://openhouse.example"
        );
    }

    #[test]
    fn store_failures_expose_raw_message() {
        let response = respond(
            Err(HandlerError::Store(StoreError::Backend("testError".to_string()))),
            "*",
        );

        assert_eq!(response.status_code, 500);
        assert_eq!(response.json_body(), Some(json!({"error": "testError"})));
    }

    #[test]
    fn method_not_allowed_has_no_body() {
        let response = respond(Err(HandlerError::MethodNotAllowed), "*");

        assert_eq!(response.status_code, 405);
        assert!(response.body.is_none());
    }
}
