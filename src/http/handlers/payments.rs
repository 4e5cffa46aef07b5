use crate::domain::payment::{
    CreateOrderRequest, ErrorEnvelope, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection).into_response(),
    };

    match state.payment_service.create_order(req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => (e.status(), Json(ErrorEnvelope::new(&e.public_message()))).into_response(),
    }
}

pub async fn verify_payment(
    State(state): State<AppState>,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection).into_response(),
    };

    match state.payment_service.verify(req).await {
        Ok(report) => (
            axum::http::StatusCode::OK,
            Json(VerifyPaymentResponse {
                success: true,
                message: "Payment verified successfully".to_string(),
                payment_id: report.record.payment_id,
            }),
        )
            .into_response(),
        Err(e) => (e.status(), Json(ErrorEnvelope::new(&e.public_message()))).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

fn bad_body(rejection: JsonRejection) -> impl IntoResponse {
    tracing::warn!("rejected request body: {}", rejection.body_text());
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(ErrorEnvelope::new("Invalid request body")),
    )
}
