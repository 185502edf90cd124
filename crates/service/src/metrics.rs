use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resource_library_http_requests_total",
        "Total HTTP requests handled"
    )
    .expect("register http_requests_total")
});

pub static HTTP_REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "resource_library_http_request_duration_seconds",
        "HTTP request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register http_request_duration")
});

pub static LEADS_RECORDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resource_library_leads_recorded_total",
        "Total leads appended"
    )
    .expect("register leads_recorded_total")
});

pub static DOWNLOADS_COUNTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resource_library_downloads_counted_total",
        "Total successful download counter increments"
    )
    .expect("register downloads_counted_total")
});

pub static COUNTER_UPDATE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resource_library_counter_update_failures_total",
        "Download counter increments that failed and were dropped"
    )
    .expect("register counter_update_failures_total")
});

pub static BLOB_CLEANUP_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resource_library_blob_cleanup_failures_total",
        "Blob deletions that failed after a resource was removed"
    )
    .expect("register blob_cleanup_failures_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_output_names_counters() {
        LEADS_RECORDED_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("resource_library_leads_recorded_total"));
    }
}
