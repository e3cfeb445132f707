use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

// Prometheus metrics (default registry)
pub static CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "service_client_calls_total",
        "Service invocations by service, dispatch mode and outcome",
        &["service", "mode", "outcome"]
    )
    .expect("register service_client_calls_total")
});

pub static CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "service_client_call_duration_seconds",
        "Service invocation duration in seconds",
        &["service", "mode"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register service_client_call_duration_seconds")
});
