use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{ApiError, FieldError};
use crate::render::Renderer;

/// Wire envelope for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorPayload,
}

/// Error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorPayload {
    /// Short machine-readable identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// Human-readable, public-safe message
    pub message: String,
    /// Present only for field validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorResponse {
    /// Project the public parts of `err`; the cause never makes it here.
    pub fn from_error(err: &ApiError) -> Self {
        let (_, code, message, fields) = err.extract();
        Self {
            error: ErrorPayload {
                code: code.to_string(),
                message: message.to_string(),
                fields: fields.to_vec(),
            },
        }
    }
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self::from_error(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Renderer::current().respond_api_error(&self)
    }
}
