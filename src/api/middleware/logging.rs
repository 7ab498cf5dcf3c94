use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Logger handed to handlers through request extensions
#[derive(Debug, Clone)]
pub struct RequestLogger(pub Span);

/// Middleware that opens a span per request, injects it as a
/// [`RequestLogger`] and logs the outcome
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path
    );
    request.extensions_mut().insert(RequestLogger(span.clone()));

    info!(parent: &span, query = %sanitize_query(&query), "Incoming request");

    let response = next.run(request).instrument(span.clone()).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() || status.is_redirection() || status.is_informational() {
        info!(
            parent: &span,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            parent: &span,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed (client error)"
        );
    } else {
        warn!(
            parent: &span,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed (server error)"
        );
    }

    response
}

/// Sanitize query parameters to hide sensitive data
fn sanitize_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive(key) => format!("{}=***", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "api_key" | "token" | "password" | "secret" | "page_token"
    )
}
