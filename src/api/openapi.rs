use utoipa::OpenApi;

use crate::errors::{ErrorPayload, ErrorResponse, FieldError};
use crate::render::{Created, Meta};

/// Shared wire types, for services to merge into their own documents
#[derive(OpenApi)]
#[openapi(
    info(
        title = "REST envelope",
        version = "0.1.0",
        description = "Standard success and error envelopes shared by every endpoint.",
    ),
    components(schemas(ErrorResponse, ErrorPayload, FieldError, Meta, Created))
)]
pub struct ApiDoc;
