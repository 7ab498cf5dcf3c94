use axum::http::StatusCode;
use std::fmt;

use super::model::ApiError;

/// Non-standard status used when the client went away before we answered.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Canonical public errors, one per common HTTP status.
///
/// These are the fallbacks used whenever a handler fails without a bespoke
/// public message. They carry no cause-specific detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericError {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    PayloadTooLarge,
    UnsupportedMediaType,
    UnprocessableEntity,
    TooManyRequests,
    RequestCancelled,
    InternalServerError,
    GatewayTimeout,
}

impl GenericError {
    pub const ALL: [GenericError; 12] = [
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::Conflict,
        Self::PayloadTooLarge,
        Self::UnsupportedMediaType,
        Self::UnprocessableEntity,
        Self::TooManyRequests,
        Self::RequestCancelled,
        Self::InternalServerError,
        Self::GatewayTimeout,
    ];

    /// Raw status code for this default
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::PayloadTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::UnprocessableEntity => 422,
            Self::TooManyRequests => 429,
            Self::RequestCancelled => CLIENT_CLOSED_REQUEST,
            Self::InternalServerError => 500,
            Self::GatewayTimeout => 504,
        }
    }

    pub fn status(&self) -> StatusCode {
        // Every entry is in 100..=999 so the conversion cannot fail.
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "generic_bad_request",
            Self::Unauthorized => "generic_unauthorized",
            Self::Forbidden => "generic_forbidden",
            Self::NotFound => "generic_not_found",
            Self::Conflict => "generic_conflict",
            Self::PayloadTooLarge => "generic_payload_too_large",
            Self::UnsupportedMediaType => "generic_unsupported_media_type",
            Self::UnprocessableEntity => "generic_unprocessable_entity",
            Self::TooManyRequests => "generic_too_many_requests",
            Self::RequestCancelled => "generic_request_cancelled",
            Self::InternalServerError => "generic_internal_server_error",
            Self::GatewayTimeout => "generic_gateway_timeout",
        }
    }

    /// Public description. Standard reason phrase unless a more useful
    /// generic sentence exists.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::UnprocessableEntity => {
                "Your request has not been processed, some precondition failed"
            }
            Self::TooManyRequests => "Too Many Requests",
            Self::RequestCancelled => "Request Cancelled",
            Self::InternalServerError => "Internal Server Error",
            Self::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// Look up the default registered for `status`, if any
    pub fn from_status(status: StatusCode) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|generic| generic.status_code() == status.as_u16())
    }

    /// Fresh `ApiError` carrying this default
    pub fn to_error(&self) -> ApiError {
        ApiError::new(None, self.status(), self.code(), self.description())
    }

    /// Same as [`to_error`](Self::to_error) but keeps `cause` for the logs
    pub fn with_cause(&self, cause: impl Into<anyhow::Error>) -> ApiError {
        self.to_error().with_cause(cause)
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<GenericError> for ApiError {
    fn from(generic: GenericError) -> Self {
        generic.to_error()
    }
}

/// Registry default for the status a handler intended.
///
/// A 4xx without its own entry becomes the generic bad request. A missing
/// status or any other unregistered status becomes the internal server error.
pub fn default_for(status: Option<StatusCode>) -> ApiError {
    let generic = match status {
        Some(status) => GenericError::from_status(status).unwrap_or(if status.is_client_error() {
            GenericError::BadRequest
        } else {
            GenericError::InternalServerError
        }),
        None => GenericError::InternalServerError,
    };
    generic.to_error()
}
