pub mod registry;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

/// Handler for the /metrics endpoint
/// Returns metrics in Prometheus exposition format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => {
            let body = String::from_utf8(buffer).unwrap_or_default();
            (
                StatusCode::OK,
                [("Content-Type", encoder.format_type())],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn record_response(status: StatusCode, encoding: &str) {
    registry::HTTP_RESPONSES_TOTAL
        .with_label_values(&[status.as_str(), encoding])
        .inc();
}

pub fn record_error_response(code: &str) {
    registry::HTTP_ERROR_RESPONSES_TOTAL
        .with_label_values(&[code])
        .inc();
}

pub fn record_encode_failure(encoding: &str) {
    registry::RESPONSE_ENCODE_FAILURES_TOTAL
        .with_label_values(&[encoding])
        .inc();
}

pub use registry::{
    init_metrics, HTTP_ERROR_RESPONSES_TOTAL, HTTP_RESPONSES_TOTAL, RESPONSE_ENCODE_FAILURES_TOTAL,
};
