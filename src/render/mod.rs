//! Turns handler outcomes into responses.
//!
//! Every body leaves through here wrapped in one of two envelopes:
//! `{"data": .., "meta": ..}` on success or `{"error": {..}}` on failure.
//! Each call builds exactly one response, so status and headers are only
//! ever set once.

pub mod schema;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use tracing::{error, warn, Span};
use utoipa::ToSchema;

use crate::errors::{as_public_error, ApiError, ErrorResponse, GenericError};
use crate::metrics;
use schema::{SchemaMarshaller, SchemaMessage};

pub const JSON_CONTENT_TYPE: &str = "application/json";

const ENCODING_JSON: &str = "json";
const ENCODING_SCHEMA_JSON: &str = "schema_json";
const ENCODING_EMPTY: &str = "empty";

/// Pagination info for list responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    /// Total number of results across all pages
    pub total_size: i32,
    /// Token for the next page, empty on the last page
    pub next_page_token: String,
}

/// Success envelope. A missing `meta` is written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<D, M> {
    pub data: D,
    pub meta: Option<M>,
}

/// Body of a 201 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Created {
    pub id: String,
}

/// Renders responses and logs through the span it was given.
#[derive(Debug, Clone)]
pub struct Renderer {
    log: Span,
    marshaller: SchemaMarshaller,
}

impl Renderer {
    pub fn new(log: Span) -> Self {
        Self {
            log,
            marshaller: SchemaMarshaller::for_responses(),
        }
    }

    /// Renderer logging into whatever span is active
    pub fn current() -> Self {
        Self::new(Span::current())
    }

    pub fn span(&self) -> &Span {
        &self.log
    }

    /// Write `body` as JSON with no envelope around it.
    ///
    /// For the few endpoints whose clients cannot take `{data, meta}`.
    /// Encode failures behave as in [`respond_success`](Self::respond_success).
    pub fn respond<T: Serialize>(&self, status: StatusCode, body: T) -> Response {
        match serde_json::to_vec(&body) {
            Ok(body) => self.json(status, body, ENCODING_JSON),
            Err(e) => {
                error!(
                    parent: &self.log,
                    error = %e,
                    status = status.as_u16(),
                    "unable to encode response"
                );
                metrics::record_encode_failure(ENCODING_JSON);
                self.json(status, Vec::new(), ENCODING_JSON)
            }
        }
    }

    /// Schema-marshalled `message` with no envelope around it.
    ///
    /// A marshalling failure is logged and the status is kept with an empty
    /// body.
    pub fn respond_schema(&self, status: StatusCode, message: &dyn SchemaMessage) -> Response {
        match self.marshaller.marshal(message) {
            Ok(body) => self.json(status, body, ENCODING_SCHEMA_JSON),
            Err(e) => {
                error!(
                    parent: &self.log,
                    schema = message.full_name(),
                    error = %e,
                    status = status.as_u16(),
                    "unable to marshal schema response"
                );
                metrics::record_encode_failure(ENCODING_SCHEMA_JSON);
                self.json(status, Vec::new(), ENCODING_SCHEMA_JSON)
            }
        }
    }

    /// Write `{data, meta}` with `status`.
    ///
    /// The status is committed before the body is encoded; if encoding fails
    /// the failure is logged and the client gets the status with an empty body.
    pub fn respond_success<D, M>(&self, status: StatusCode, data: D, meta: Option<M>) -> Response
    where
        D: Serialize,
        M: Serialize,
    {
        let envelope = Envelope { data, meta };
        match serde_json::to_vec(&envelope) {
            Ok(body) => self.json(status, body, ENCODING_JSON),
            Err(e) => {
                error!(
                    parent: &self.log,
                    error = %e,
                    status = status.as_u16(),
                    "unable to encode response data"
                );
                metrics::record_encode_failure(ENCODING_JSON);
                self.json(status, Vec::new(), ENCODING_JSON)
            }
        }
    }

    /// 201 with `{"data": {"id": id}, "meta": null}`
    pub fn respond_created(&self, id: impl Into<String>) -> Response {
        self.respond_success(StatusCode::CREATED, Created { id: id.into() }, None::<Meta>)
    }

    /// 204, nothing to return
    pub fn respond_no_content(&self) -> Response {
        metrics::record_response(StatusCode::NO_CONTENT, ENCODING_EMPTY);
        (
            StatusCode::NO_CONTENT,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        )
            .into_response()
    }

    /// Write the error envelope for any error.
    ///
    /// If `err` is or wraps an [`ApiError`] its public parts are written with
    /// its status. Anything else becomes the generic internal server error;
    /// its text only reaches the logs.
    pub fn respond_error(&self, err: &(dyn StdError + 'static)) -> Response {
        match as_public_error(err) {
            Some(api_err) => {
                self.log_api_error(api_err, &error_chain(err));
                self.write_error(api_err)
            }
            None => {
                error!(
                    parent: &self.log,
                    error = %error_chain(err),
                    "unclassified error, responding with internal server error"
                );
                self.write_error(&GenericError::InternalServerError.to_error())
            }
        }
    }

    pub fn respond_anyhow(&self, err: &anyhow::Error) -> Response {
        let err: &(dyn StdError + 'static) = err.as_ref();
        self.respond_error(err)
    }

    pub fn respond_api_error(&self, err: &ApiError) -> Response {
        self.log_api_error(err, &err.as_text());
        self.write_error(err)
    }

    /// Same envelope as [`respond_success`](Self::respond_success), with
    /// `data` produced by the schema marshaller (all fields, schema names).
    ///
    /// Any marshalling failure aborts with a bare 500.
    pub fn respond_schema_success<M>(
        &self,
        status: StatusCode,
        message: &dyn SchemaMessage,
        meta: Option<M>,
    ) -> Response
    where
        M: Serialize,
    {
        let bytes = match self.marshaller.marshal(message) {
            Ok(bytes) => bytes,
            Err(e) => return self.abort(message.full_name(), "unable to marshal schema data", &e),
        };

        let data: Value = match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(e) => {
                return self.abort(message.full_name(), "unable to parse marshalled schema data", &e)
            }
        };

        match serde_json::to_vec(&Envelope { data, meta }) {
            Ok(body) => self.json(status, body, ENCODING_SCHEMA_JSON),
            Err(e) => self.abort(message.full_name(), "unable to encode response", &e),
        }
    }

    fn write_error(&self, err: &ApiError) -> Response {
        let status = err.status();
        metrics::record_error_response(err.code());

        match serde_json::to_vec(&ErrorResponse::from_error(err)) {
            Ok(body) => self.json(status, body, ENCODING_JSON),
            Err(e) => {
                error!(
                    parent: &self.log,
                    error = %e,
                    status = status.as_u16(),
                    "unable to encode error response"
                );
                metrics::record_encode_failure(ENCODING_JSON);
                self.json(status, Vec::new(), ENCODING_JSON)
            }
        }
    }

    fn log_api_error(&self, err: &ApiError, detail: &str) {
        if err.status().is_server_error() {
            error!(
                parent: &self.log,
                code = err.code(),
                status = err.status().as_u16(),
                error = %detail,
                "request failed"
            );
        } else {
            warn!(
                parent: &self.log,
                code = err.code(),
                status = err.status().as_u16(),
                error = %detail,
                "request rejected"
            );
        }
    }

    fn abort(&self, message_name: &str, what: &str, err: &dyn StdError) -> Response {
        error!(parent: &self.log, schema = message_name, error = %err, "{}", what);
        metrics::record_encode_failure(ENCODING_SCHEMA_JSON);
        metrics::record_response(StatusCode::INTERNAL_SERVER_ERROR, ENCODING_EMPTY);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }

    fn json(&self, status: StatusCode, body: Vec<u8>, encoding: &str) -> Response {
        metrics::record_response(status, encoding);
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            Body::from(body),
        )
            .into_response()
    }
}

/// Messages from `err` down its source chain. Stops at an `ApiError`, whose
/// text already carries its cause.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = Vec::new();
    for e in std::iter::successors(Some(err), |&e| e.source()) {
        parts.push(e.to_string());
        if e.is::<ApiError>() {
            break;
        }
    }
    parts.join(": ")
}
