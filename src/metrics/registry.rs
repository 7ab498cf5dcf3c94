use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    pub static ref HTTP_RESPONSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_responses_total",
        "Total responses rendered",
        &["status", "encoding"]  // encoding: json, schema_json, empty
    )
    .unwrap();

    pub static ref HTTP_ERROR_RESPONSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_error_responses_total",
        "Total error envelopes rendered",
        &["code"]
    )
    .unwrap();

    pub static ref RESPONSE_ENCODE_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "response_encode_failures_total",
        "Total responses whose body could not be encoded",
        &["encoding"]
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_RESPONSES_TOTAL);
    lazy_static::initialize(&HTTP_ERROR_RESPONSES_TOTAL);
    lazy_static::initialize(&RESPONSE_ENCODE_FAILURES_TOTAL);
}
