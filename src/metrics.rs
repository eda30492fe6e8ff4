//! Prometheus metrics: request counters plus the business counters the
//! order/payout pipeline emits.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests processed"),
            &["method", "status"],
        )
        .expect("metric definition is valid");
        REGISTRY
            .register(Box::new(counter.clone()))
            .expect("metric registers once");
        counter
    };

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = {
        let histogram = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method"],
        )
        .expect("metric definition is valid");
        REGISTRY
            .register(Box::new(histogram.clone()))
            .expect("metric registers once");
        histogram
    };

    pub static ref ORDERS_PLACED_TOTAL: IntCounter =
        register_counter("orders_placed_total", "Checkouts completed");
    pub static ref PAYMENTS_CAPTURED_TOTAL: IntCounter =
        register_counter("payments_captured_total", "Card payments captured");
    pub static ref RETURNS_OPENED_TOTAL: IntCounter =
        register_counter("returns_opened_total", "Return requests opened");
    pub static ref REFUNDS_ISSUED_TOTAL: IntCounter =
        register_counter("refunds_issued_total", "Refunds issued");
    pub static ref PAYOUTS_CREATED_TOTAL: IntCounter =
        register_counter("payouts_created_total", "Payout rows created");
}

fn register_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
}

/// Renders the registry in the Prometheus text exposition format.
pub fn metrics_handler() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Axum middleware recording one observation per request.
pub async fn track_http_metrics(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().to_string();
    let timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method.as_str()])
        .start_timer();

    let response = next.run(request).await;

    timer.observe_duration();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();

    response
}
