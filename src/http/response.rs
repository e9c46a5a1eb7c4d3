//! Error responses.
//!
//! # Responsibilities
//! - Translate domain errors into the API error taxonomy
//! - Render every error as a JSON object with an `error` string
//! - Log errors at the boundary with the failing operation
//!
//! # Design Decisions
//! - Contextual fields (e.g. `available_countries`) are merged into the body
//! - Only the 500 path exposes the underlying message

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::university::UniversityError;
use crate::visa::{UnknownVisaType, VisaError, VisaType};

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing parameters (400).
    #[error("{message}")]
    InvalidRequest { message: String, context: Map<String, Value> },

    /// Unknown type, country or resource (404).
    #[error("{message}")]
    NotFound { message: String, context: Map<String, Value> },

    /// Preprocessing never ran (404).
    #[error("University data not found. Please run the CSV parser first.")]
    DataNotFound,

    /// Missing or wrong admin credentials (401).
    #[error("Unauthorized")]
    Unauthorized,

    /// Known path, unrouted method (405).
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request outlived `timeouts.request_secs` (408).
    #[error("Request timed out")]
    Timeout,

    /// Unexpected parse or IO failure (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest {
            message: message.into(),
            context: Map::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Attach a contextual field to a 400 or 404 body. Other variants are unchanged.
    pub fn with_context(mut self, key: &str, value: impl Serialize) -> Self {
        if let ApiError::InvalidRequest { context, .. } | ApiError::NotFound { context, .. } =
            &mut self
        {
            let value = serde_json::to_value(value).unwrap_or(Value::Null);
            context.insert(key.to_string(), value);
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } | ApiError::DataNotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body sent to the client.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        match self {
            ApiError::InvalidRequest { message, context } | ApiError::NotFound { message, context } => {
                body.insert("error".to_string(), Value::String(message.clone()));
                body.extend(context.clone());
            }
            ApiError::Internal(message) => {
                body.insert("error".to_string(), "Internal server error".into());
                body.insert("message".to_string(), Value::String(message.clone()));
            }
            ApiError::DataNotFound
            | ApiError::Unauthorized
            | ApiError::MethodNotAllowed
            | ApiError::Timeout => {
                body.insert("error".to_string(), Value::String(self.to_string()));
            }
        }
        Value::Object(body)
    }

    /// Log this error against the operation that produced it.
    pub fn log(&self, operation: &'static str) {
        if self.status().is_server_error() {
            tracing::error!(operation, error = %self, "Request failed");
        } else {
            tracing::warn!(operation, status = %self.status(), error = %self, "Request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Replace the empty 408 produced by the timeout layer with a JSON body.
pub async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        ApiError::Timeout.log("timeout");
        return ApiError::Timeout.into_response();
    }
    response
}

/// Log the error side of a handler result.
pub trait Traced {
    fn traced(self, operation: &'static str) -> Self;
}

impl<T> Traced for Result<T, ApiError> {
    fn traced(self, operation: &'static str) -> Self {
        if let Err(e) = &self {
            e.log(operation);
        }
        self
    }
}

impl From<UnknownVisaType> for ApiError {
    fn from(e: UnknownVisaType) -> Self {
        ApiError::invalid(e.to_string()).with_context("valid_types", VisaType::valid_keys())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            ApiError::Internal(rejection.body_text())
        } else {
            ApiError::invalid(rejection.body_text())
        }
    }
}

impl From<VisaError> for ApiError {
    fn from(e: VisaError) -> Self {
        match e {
            VisaError::NotFound(_) => ApiError::not_found(e.to_string()),
            VisaError::Parse { .. } | VisaError::Io { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UniversityError> for ApiError {
    fn from(e: UniversityError) -> Self {
        match e {
            UniversityError::DataNotFound => ApiError::DataNotFound,
            UniversityError::CountryNotFound(_) => ApiError::not_found("Country not found"),
            UniversityError::InvalidRequest(message) => ApiError::invalid(message),
            UniversityError::Parse { .. } | UniversityError::Io { .. } => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn render(error: ApiError) -> (StatusCode, Value) {
        decode(error.into_response()).await
    }

    async fn decode(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_merges_context() {
        let error = ApiError::not_found("Country 'x' not found")
            .with_context("available_countries", json!([{"key": "france", "name": "France"}]));
        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Country 'x' not found");
        assert_eq!(body["available_countries"][0]["key"], "france");
    }

    #[tokio::test]
    async fn test_internal_includes_message() {
        let (status, body) = render(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error", "message": "disk on fire"}));
    }

    #[tokio::test]
    async fn test_unknown_visa_type_lists_valid_types() {
        let error: ApiError = "business".parse::<VisaType>().unwrap_err().into();
        let (status, body) = render(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid_types"], json!(["tourist", "study", "work", "medical"]));
    }

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(
            ApiError::from(UniversityError::DataNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UniversityError::InvalidRequest("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(VisaError::NotFound(VisaType::Work)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(VisaError::Parse {
                visa_type: VisaType::Work,
                reason: "eof".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_timeout_gets_json_body() {
        let bare = StatusCode::REQUEST_TIMEOUT.into_response();
        let (status, body) = decode(timeout_as_json(bare).await).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, json!({"error": "Request timed out"}));
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = timeout_as_json(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_context_ignored_for_internal() {
        let error = ApiError::Internal("x".into()).with_context("k", 1);
        assert_eq!(error.body().get("k"), None);
    }
}
