mod support;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bizcivitas_payments::domain::payment::CreateOrderRequest;
use bizcivitas_payments::gateways::mock::MockGateway;
use bizcivitas_payments::gateways::PaymentGateway;
use bizcivitas_payments::http::handlers::payments::create_order;
use bizcivitas_payments::messaging::mock::MockSender;
use support::*;

fn request(amount: f64) -> CreateOrderRequest {
    serde_json::from_value(serde_json::json!({
        "amount": amount,
        "notes": {
            "first_name": "Asha",
            "phone": "9876543210",
            "gst_number": "",
            "paid_for": "Core Membership",
            "utm_campaign": "diwali"
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn creates_order_in_minor_units() {
    let gateway = MockGateway::new("ALWAYS_SUCCESS");
    let state = app_state(service(&gateway, &MockSender::new(), &MemoryStore::default()));

    let resp = create_order(State(state), Ok(Json(request(8259.0)))).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["amount"], 825900);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key_id"], "rzp_test_key");

    let order = gateway
        .fetch_order(body["order_id"].as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(order.notes.first_name.as_deref(), Some("Asha"));
    assert_eq!(order.notes.gst_number, None);
    assert!(order.receipt.unwrap().starts_with("rcpt_"));
}

#[tokio::test]
async fn rejects_non_positive_and_sub_rupee_amounts() {
    let gateway = MockGateway::new("ALWAYS_SUCCESS");
    let svc = service(&gateway, &MockSender::new(), &MemoryStore::default());

    for amount in [0.0, -10.0, 0.5] {
        let resp = create_order(State(app_state(svc.clone())), Ok(Json(request(amount))))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["success"], false);
    }
}

#[tokio::test]
async fn gateway_failure_is_a_generic_500() {
    let gateway = MockGateway::new("ALWAYS_FAILURE");
    let state = app_state(service(&gateway, &MockSender::new(), &MemoryStore::default()));

    let resp = create_order(State(state), Ok(Json(request(499.0)))).await.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["message"], "Failed to create order");
}
