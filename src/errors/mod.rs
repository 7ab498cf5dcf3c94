//! Error taxonomy, classification and the public error envelope

pub mod classify;
pub mod codes;
pub mod model;
pub mod response;
pub mod validation;

pub use classify::{
    is_already_exists, is_already_exists_anyhow, is_not_found, is_not_found_anyhow,
};
pub use codes::{default_for, GenericError, CLIENT_CLOSED_REQUEST};
pub use model::{as_public_anyhow, as_public_error, ApiError, ErrorKind, FieldError};
pub use response::{ErrorPayload, ErrorResponse};
pub use validation::field_errors_from_validation;
