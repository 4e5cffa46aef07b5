use crate::domain::payment::ErrorEnvelope;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const INTERNAL_API_KEY_HEADER: &str = "X-Internal-Api-Key";

/// Admin routes require the shared internal key. An empty configured key
/// locks the routes entirely.
pub async fn require_internal_api_key(
    State(expected): State<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if expected.is_empty() || provided != expected {
        tracing::warn!("rejected admin request to {}", request.uri().path());
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorEnvelope::new("Unauthorized")),
        )
            .into_response();
    }

    next.run(request).await
}
