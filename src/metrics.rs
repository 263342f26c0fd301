use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("proxy_requests_total", "Total number of requests").unwrap();
    pub static ref BLOCKED_ORIGINS: Counter = register_counter!(
        "proxy_blocked_origin_total",
        "Requests rejected by the origin check"
    )
    .unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "proxy_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS: Counter = register_counter!(
        "proxy_upstream_errors_total",
        "Non-success responses from the upstream API"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "proxy_request_latency_seconds",
        "Time until the upstream response headers arrive"
    )
    .unwrap();
    pub static ref RATE_ENTRIES: Gauge = register_gauge!(
        "proxy_rate_limit_entries",
        "Current number of tracked client windows"
    )
    .unwrap();
}
