use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{
    BLOCKED_ORIGINS, RATE_ENTRIES, RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_ERRORS,
};
use crate::models::ChatRequest;
use crate::rate_limit::Decision;
use crate::state::AppState;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

const INVALID_REQUEST: &str = "Invalid request: messages array required";

// Every response carries these so browsers can read error bodies too
fn cors_headers(allow_origin: HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers
}

fn error_response(status: StatusCode, headers: HeaderMap, body: Value) -> Response {
    (status, headers, Json(body)).into_response()
}

// Rate limit buckets are keyed by the caller's forwarded address
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// Proxy dispatcher: method gate -> origin gate -> rate gate -> credential
// gate -> shaping -> single upstream attempt -> relay
pub async fn chat_handler(State(state): State<Arc<AppState>>, req: Request) -> Response {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let (parts, body) = req.into_parts();

    let origin = parts.headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let referer = parts.headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    let origin_ok = state.origins.is_allowed(origin, referer);
    let cors = cors_headers(state.origins.cors_origin(origin));

    // CORS preflight is terminal, origin validity notwithstanding
    if parts.method == Method::OPTIONS {
        return (StatusCode::OK, cors, ()).into_response();
    }

    if !origin_ok {
        BLOCKED_ORIGINS.inc();
        eprintln!(
            "Blocked request from invalid origin: {}",
            origin.or(referer).unwrap_or("unknown")
        );
        return error_response(
            StatusCode::FORBIDDEN,
            cors,
            json!({
                "error": "Forbidden",
                "message": "Requests are only allowed from approved origins"
            }),
        );
    }

    if parts.method != Method::POST {
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            cors,
            json!({"error": "Method not allowed"}),
        );
    }

    let key = client_key(&parts.headers);
    let remaining = match state.rate_limiter.check(&key) {
        Decision::Limited { retry_after_secs } => {
            RATE_LIMITED.inc();
            let mut headers = cors;
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            return error_response(
                StatusCode::TOO_MANY_REQUESTS,
                headers,
                json!({
                    "error": "Rate limit exceeded",
                    "message": format!(
                        "Too many requests. Please try again in {} seconds.",
                        retry_after_secs
                    ),
                    "retryAfter": retry_after_secs
                }),
            );
        }
        Decision::Admitted { remaining } => remaining,
    };

    // opportunistic cleanup of expired client windows
    state.rate_limiter.maybe_sweep();
    RATE_ENTRIES.set(state.rate_limiter.entries() as f64);

    let Some(api_key) = state.api_key.as_deref() else {
        eprintln!("API_KEY not configured, rejecting request");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            cors,
            json!({"error": "Service configuration error"}),
        );
    };

    let invalid_request = json!({"error": INVALID_REQUEST});
    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, cors, invalid_request),
    };
    let inbound: ChatRequest = match serde_json::from_slice(&bytes) {
        Ok(req) => req,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, cors, invalid_request),
    };
    let Some(upstream_req) = inbound.into_upstream(&state.model) else {
        return error_response(StatusCode::BAD_REQUEST, cors, invalid_request);
    };

    let url = format!("{}/chat/completions", state.api_url.trim_end_matches('/'));
    let upstream_res = match state
        .client
        .post(&url)
        .bearer_auth(api_key)
        .json(&upstream_req)
        .send()
        .await
    {
        Ok(res) => res,
        Err(e) => {
            eprintln!("Upstream request failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                cors,
                json!({"error": "Proxy error", "message": e.to_string()}),
            );
        }
    };
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    let status = upstream_res.status();
    if !status.is_success() {
        UPSTREAM_ERRORS.inc();
        // best-effort extraction of the upstream error message
        let message = upstream_res
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        eprintln!("Upstream API error: {} {}", status, message);
        return error_response(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            cors,
            json!({
                "error": "AI API error",
                "message": message,
                "status": status.as_u16()
            }),
        );
    }

    if upstream_req.stream {
        let mut headers = cors;
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        insert_rate_headers(&mut headers, state.rate_limiter.quota(), remaining);

        // Relay bytes as they arrive; the stream owns the upstream response,
        // so a client disconnect drops it and aborts the transfer
        return (StatusCode::OK, headers, Body::from_stream(upstream_res.bytes_stream()))
            .into_response();
    }

    let body = match upstream_res.json::<Value>().await {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Failed to read upstream response: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                cors,
                json!({"error": "Proxy error", "message": e.to_string()}),
            );
        }
    };

    let mut headers = cors;
    insert_rate_headers(&mut headers, state.rate_limiter.quota(), remaining);
    (StatusCode::OK, headers, Json(body)).into_response()
}

fn insert_rate_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(HeaderName::from_static("x-ratelimit-limit"), HeaderValue::from(limit));
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(remaining),
    );
}
