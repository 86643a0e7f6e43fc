use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, TextEncoder,
};

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "live_qa_http_requests_total",
            "Total HTTP requests handled by live-qa-service",
        ),
        &["method", "path", "status"],
    )
    .expect("failed to create live_qa_http_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register live_qa_http_requests_total");
    counter
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "live_qa_http_request_duration_seconds",
            "HTTP request latency for live-qa-service",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
        ]),
        &["method", "path", "status"],
    )
    .expect("failed to create live_qa_http_request_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register live_qa_http_request_duration_seconds");
    histogram
});

static LIVE_SUBSCRIBERS: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "live_qa_live_subscribers",
        "Live viewers currently registered across all rooms",
    )
    .expect("failed to create live_qa_live_subscribers");
    prometheus::default_registry()
        .register(Box::new(gauge.clone()))
        .expect("failed to register live_qa_live_subscribers");
    gauge
});

static BROADCASTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("live_qa_broadcasts_total", "Events fanned out to a room"),
        &["kind"],
    )
    .expect("failed to create live_qa_broadcasts_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register live_qa_broadcasts_total");
    counter
});

static DELIVERY_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "live_qa_delivery_failures_total",
        "Viewer writes that failed during a broadcast",
    )
    .expect("failed to create live_qa_delivery_failures_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register live_qa_delivery_failures_total");
    counter
});

pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status_label = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status_label])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status_label])
        .observe(elapsed.as_secs_f64());
}

pub fn subscriber_added() {
    LIVE_SUBSCRIBERS.inc();
}

pub fn subscriber_removed() {
    LIVE_SUBSCRIBERS.dec();
}

pub fn record_broadcast(kind: &str) {
    BROADCASTS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_delivery_failure() {
    DELIVERY_FAILURES_TOTAL.inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
