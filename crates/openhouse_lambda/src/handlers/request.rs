use serde::Deserialize;
use serde_json::Value;

use super::error::HandlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Other,
}

impl Method {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// The subset of an API Gateway proxy event the handlers read.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl ApiGatewayRequest {
    pub fn from_event(event: Value) -> Result<Self, HandlerError> {
        if !event.is_object() {
            return Err(HandlerError::MalformedBody(
                "Request payload must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(event)
            .map_err(|error| HandlerError::MalformedBody(format!("Malformed request: {error}")))
    }

    pub fn method(&self) -> Method {
        Method::parse(&self.http_method)
    }

    pub fn path_uuid(&self) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|parameters| parameters.get("uuid"))
            .and_then(Value::as_str)
            .filter(|uuid| !uuid.is_empty())
    }

    pub fn require_uuid(&self) -> Result<&str, HandlerError> {
        self.path_uuid().ok_or(HandlerError::MissingUuid)
    }

    /// Decodes the body. API Gateway delivers it as a JSON string; an
    /// already-decoded value is accepted as is.
    pub fn json_body(&self) -> Result<Value, HandlerError> {
        match &self.body {
            None | Some(Value::Null) => Err(HandlerError::MalformedBody(
                "Missing request body".to_string(),
            )),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map_err(|error| HandlerError::MalformedBody(format!("Malformed JSON body: {error}"))),
            Some(value) => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_method_uuid_and_string_body() {
        let request = ApiGatewayRequest::from_event(json!({
            "httpMethod": "put",
            "pathParameters": {"uuid": "fee567a4-c080-4ce9-8771-50aba119ecb1"},
            "body": "{\"name\":\"Faculty of Testing\"}",
        }))
        .expect("request should parse");

        assert_eq!(request.method(), Method::Put);
        assert_eq!(
            request.require_uuid().expect("uuid should be present"),
            "fee567a4-c080-4ce9-8771-50aba119ecb1"
        );
        assert_eq!(
            request.json_body().expect("body should parse"),
            json!({"name": "Faculty of Testing"})
        );
    }

    #[test]
    fn missing_or_null_path_parameters_mean_no_uuid() {
        for event in [
            json!({"httpMethod": "DELETE"}),
            json!({"httpMethod": "DELETE", "pathParameters": null}),
            json!({"httpMethod": "DELETE", "pathParameters": {"uuid": ""}}),
        ] {
            let request = ApiGatewayRequest::from_event(event).expect("request should parse");
            assert!(matches!(request.require_uuid(), Err(HandlerError::MissingUuid)));
        }
    }

    #[test]
    fn rejects_malformed_and_missing_bodies() {
        let malformed = ApiGatewayRequest::from_event(json!({"httpMethod": "POST", "body": "{"}))
            .expect("request should parse");
        assert!(matches!(malformed.json_body(), Err(HandlerError::MalformedBody(_))));

        let missing = ApiGatewayRequest::from_event(json!({"httpMethod": "POST"}))
            .expect("request should parse");
        assert!(matches!(missing.json_body(), Err(HandlerError::MalformedBody(_))));
    }

    #[test]
    fn unknown_methods_are_other() {
        let request = ApiGatewayRequest::from_event(json!({"httpMethod": "PATCH"}))
            .expect("request should parse");
        assert_eq!(request.method(), Method::Other);
    }
}
