use crate::domain::payment::ErrorEnvelope;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RateLimitState {
    pub redis_client: redis::Client,
    pub max_per_minute: i64,
}

/// First hop of `x-forwarded-for`, or `unknown`.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub fn window_key(ip: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    format!("rate:payments:{}:{}", ip, now.format("%Y%m%d%H%M"))
}

/// Fixed one-minute window per client IP. Fails open when redis is down so
/// checkout never depends on it.
pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers());
    let key = window_key(&ip, chrono::Utc::now());

    match state.redis_client.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let count: i64 = conn.incr(&key, 1).await.unwrap_or(1);
            let _: bool = conn.expire(&key, 120).await.unwrap_or(false);
            if count > state.max_per_minute {
                tracing::warn!("rate limit exceeded for {} on {}", ip, request.uri().path());
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorEnvelope::new("Too many requests, please try again shortly")),
                )
                    .into_response();
            }
        }
        Err(e) => tracing::debug!("rate limiter unavailable, allowing request: {}", e),
    }

    next.run(request).await
}
