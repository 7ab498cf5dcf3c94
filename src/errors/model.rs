use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use utoipa::ToSchema;

use super::codes::CLIENT_CLOSED_REQUEST;

pub const INVALID_REQUEST_CODE: &str = "invalid_request";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

/// One invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Why the field was rejected
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.field)
        } else {
            write!(f, "{}: {}", self.field, self.description)
        }
    }
}

/// Broad category of a failure, derived from its status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    GenericClient,
    Cancelled,
    UpstreamTimeout,
    Internal,
}

/// A failure on its way to the client.
///
/// Carries a public status/code/description and optionally the internal
/// cause. Only the public parts ever reach the wire; the cause is for logs.
#[derive(Debug)]
pub struct ApiError {
    cause: Option<anyhow::Error>,
    status: StatusCode,
    code: String,
    description: String,
    fields: Vec<FieldError>,
}

impl ApiError {
    pub fn new(
        cause: Option<anyhow::Error>,
        status: StatusCode,
        code: impl Into<String>,
        public_message: impl Into<String>,
    ) -> Self {
        Self {
            cause,
            status,
            code: code.into(),
            description: public_message.into(),
            fields: Vec::new(),
        }
    }

    /// The single error used for every validation failure
    pub fn from_field_errors(fields: Vec<FieldError>) -> Self {
        Self::new(
            None,
            StatusCode::BAD_REQUEST,
            INVALID_REQUEST_CODE,
            INVALID_REQUEST_MESSAGE,
        )
        .with_fields(fields)
    }

    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    /// Everything the client is allowed to see
    pub fn extract(&self) -> (StatusCode, &str, &str, &[FieldError]) {
        (self.status, &self.code, &self.description, &self.fields)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status.as_u16() {
            400 if self.code == INVALID_REQUEST_CODE => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            CLIENT_CLOSED_REQUEST => ErrorKind::Cancelled,
            504 => ErrorKind::UpstreamTimeout,
            400..=499 => ErrorKind::GenericClient,
            _ => ErrorKind::Internal,
        }
    }

    /// Diagnostic rendering for the logs. Must never be sent to a client.
    pub fn as_text(&self) -> String {
        let mut text = format!(
            "http status = {}, public message = {}",
            self.status.as_u16(),
            self.description
        );
        if !self.code.is_empty() {
            text.push_str(&format!(", code = {}", self.code));
        }
        if !self.fields.is_empty() {
            let fields: Vec<String> = self.fields.iter().map(ToString::to_string).collect();
            text.push_str(&format!(", fields = [{}]", fields.join(", ")));
        }
        if let Some(cause) = &self.cause {
            text.push_str(&format!(": {:#}", cause));
        }
        text
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Find an `ApiError` in `err` or anywhere in its source chain.
pub fn as_public_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ApiError> {
    std::iter::successors(Some(err), |&e| e.source()).find_map(|e| e.downcast_ref::<ApiError>())
}

/// [`as_public_error`] for errors that travelled through `anyhow`
pub fn as_public_anyhow(err: &anyhow::Error) -> Option<&ApiError> {
    err.chain().find_map(|e| e.downcast_ref::<ApiError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_extract_returns_construction_values() {
        let err = ApiError::new(
            Some(anyhow::anyhow!("pool timed out")),
            StatusCode::SERVICE_UNAVAILABLE,
            "db_unavailable",
            "Try again later",
        )
        .with_fields(vec![FieldError::new("name", "")]);

        let (status, code, message, fields) = err.extract();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "db_unavailable");
        assert_eq!(message, "Try again later");
        assert_eq!(fields, &[FieldError::new("name", "")]);
    }

    #[test]
    fn test_from_field_errors() {
        let err = ApiError::from_field_errors(vec![FieldError::new("email", "")]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_request");
        assert_eq!(err.description(), "Invalid request");
        assert_eq!(err.fields().len(), 1);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_as_text_order() {
        let err = ApiError::from_field_errors(vec![
            FieldError::new("email", "Invalid field, failed validation check: required"),
            FieldError::new("age", ""),
        ])
        .with_cause(anyhow::anyhow!("decoder said no"));

        assert_eq!(
            err.as_text(),
            "http status = 400, public message = Invalid request, code = invalid_request, \
             fields = [email: Invalid field, failed validation check: required, age]: decoder said no"
        );
    }

    #[test]
    fn test_as_text_minimal() {
        let err = ApiError::new(None, StatusCode::NOT_FOUND, "", "Not Found");
        assert_eq!(err.as_text(), "http status = 404, public message = Not Found");
        assert_eq!(err.to_string(), err.as_text());
    }

    #[test]
    fn test_kind_taxonomy() {
        let kind = |status: u16, code: &str| {
            let status = StatusCode::from_u16(status).unwrap();
            ApiError::new(None, status, code, "x").kind()
        };
        assert_eq!(kind(400, "invalid_request"), ErrorKind::Validation);
        assert_eq!(kind(400, "generic_bad_request"), ErrorKind::GenericClient);
        assert_eq!(kind(401, "generic_unauthorized"), ErrorKind::GenericClient);
        assert_eq!(kind(404, "generic_not_found"), ErrorKind::NotFound);
        assert_eq!(kind(409, "generic_conflict"), ErrorKind::Conflict);
        assert_eq!(kind(499, "generic_request_cancelled"), ErrorKind::Cancelled);
        assert_eq!(kind(500, "generic_internal_server_error"), ErrorKind::Internal);
        assert_eq!(kind(502, "bad_gateway"), ErrorKind::Internal);
        assert_eq!(kind(504, "generic_gateway_timeout"), ErrorKind::UpstreamTimeout);
    }

    #[test]
    fn test_source_is_cause() {
        let err = ApiError::new(None, StatusCode::CONFLICT, "c", "d")
            .with_cause(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let source = StdError::source(&err).expect("cause should be exposed as source");
        assert_eq!(source.to_string(), "disk");
    }

    #[test]
    fn test_as_public_error_finds_wrapped() {
        let wrapped: anyhow::Error = Err::<(), _>(ApiError::from_field_errors(vec![
            FieldError::new("email", ""),
        ]))
        .context("creating user")
        .context("handling request")
        .unwrap_err();

        let found = as_public_anyhow(&wrapped).expect("ApiError in chain");
        assert_eq!(found.code(), "invalid_request");
        assert_eq!(found.fields()[0].field, "email");

        let as_dyn: &(dyn StdError + 'static) = wrapped.as_ref();
        assert!(as_public_error(as_dyn).is_some());
    }

    #[test]
    fn test_as_public_error_rejects_foreign() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(as_public_error(&err).is_none());
        assert!(as_public_anyhow(&anyhow::anyhow!("boom")).is_none());
    }

    #[test]
    fn test_field_error_skips_empty_description() {
        let json = serde_json::to_string(&FieldError::new("email", "")).unwrap();
        assert_eq!(json, r#"{"field":"email"}"#);
    }
}
