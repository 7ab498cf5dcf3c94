// Library exports for testing
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod render;

pub use errors::{ApiError, FieldError, GenericError};
pub use render::{Meta, Renderer};
