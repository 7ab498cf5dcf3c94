//! Request extractors that speak the error envelope.

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use validator::Validate;

use super::middleware::RequestLogger;
use crate::errors::{default_for, field_errors_from_validation, ApiError};
use crate::render::Renderer;

#[async_trait]
impl<S> FromRequestParts<S> for Renderer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<RequestLogger>() {
            Some(RequestLogger(span)) => Renderer::new(span.clone()),
            None => Renderer::current(),
        })
    }
}

/// JSON body that has passed `validator` checks.
///
/// Undecodable bodies are rejected with the registry default for the
/// rejection's status; failed checks become one `invalid_request` error
/// listing every offending field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| ApiError::from_field_errors(field_errors_from_validation(&errors)))?;

        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    default_for(Some(rejection.status())).with_cause(rejection)
}
