use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use bizcivitas_payments::config::AppConfig;
use bizcivitas_payments::domain::notification::ContactInfo;
use bizcivitas_payments::gateways::mock::MockGateway;
use bizcivitas_payments::gateways::razorpay::RazorpayGateway;
use bizcivitas_payments::gateways::PaymentGateway;
use bizcivitas_payments::http::handlers::{ops, payments};
use bizcivitas_payments::http::middleware::admin_auth::require_internal_api_key;
use bizcivitas_payments::http::middleware::rate_limit::{self, RateLimitState};
use bizcivitas_payments::messaging::mock::MockSender;
use bizcivitas_payments::messaging::twilio::TwilioSender;
use bizcivitas_payments::messaging::MessageSender;
use bizcivitas_payments::repo::payments_repo::PaymentsRepo;
use bizcivitas_payments::service::notification_dispatcher::NotificationDispatcher;
use bizcivitas_payments::service::payment_service::PaymentService;
use bizcivitas_payments::service::ttl_cache::{SystemClock, TtlCache};
use bizcivitas_payments::AppState;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    cfg.validate()?;

    // Postgres cancels any statement that outlives the store timeout.
    let connect_options = PgConnectOptions::from_str(&cfg.database_url)?
        .options([("statement_timeout", cfg.store_timeout_ms.to_string())]);
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_millis(cfg.store_timeout_ms))
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let client = reqwest::Client::new();

    let gateway: Arc<dyn PaymentGateway> = match cfg.gateway_adapter.as_str() {
        "mock" => {
            tracing::warn!("using mock payment gateway");
            Arc::new(MockGateway::new("ALWAYS_SUCCESS"))
        }
        _ => Arc::new(RazorpayGateway {
            base_url: cfg.razorpay_base_url.clone(),
            key_id: cfg.razorpay_key_id.clone(),
            key_secret: cfg.razorpay_key_secret.clone(),
            timeout_ms: cfg.gateway_timeout_ms,
            client: client.clone(),
        }),
    };

    let sender: Arc<dyn MessageSender> = match cfg.messaging_adapter.as_str() {
        "mock" => {
            tracing::warn!("using mock message sender");
            Arc::new(MockSender::new())
        }
        _ => Arc::new(TwilioSender {
            base_url: cfg.twilio_base_url.clone(),
            account_sid: cfg.twilio_account_sid.clone(),
            auth_token: cfg.twilio_auth_token.clone(),
            sms_from: cfg.twilio_sms_from.clone(),
            whatsapp_from: cfg.twilio_whatsapp_from.clone(),
            timeout_ms: cfg.messaging_timeout_ms,
            client: client.clone(),
        }),
    };

    let payment_service = PaymentService {
        gateway,
        store: Arc::new(PaymentsRepo { pool: pool.clone() }),
        dispatcher: NotificationDispatcher {
            sender,
            contact: ContactInfo {
                email: cfg.support_email.clone(),
                phone: cfg.support_phone.clone(),
            },
            default_country_code: cfg.default_country_code.clone(),
        },
        order_cache: TtlCache::new(
            Duration::from_secs(cfg.order_cache_ttl_secs),
            Arc::new(SystemClock),
        ),
        key_id: cfg.razorpay_key_id.clone(),
        key_secret: cfg.razorpay_key_secret.clone(),
        primary_channel: cfg.primary_channel,
        store_timeout: Duration::from_millis(cfg.store_timeout_ms),
    };

    let state = AppState {
        payment_service,
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
        config: cfg.clone(),
    };

    let api_routes = Router::new()
        .route("/api/payments/create-order", post(payments::create_order))
        .route("/api/payments/verify", post(payments::verify_payment))
        .layer(from_fn_with_state(
            RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: cfg.rate_limit_per_minute,
            },
            rate_limit::enforce,
        ));

    let admin_routes = Router::new()
        .route("/ops/config-status", get(ops::config_status))
        .layer(from_fn_with_state(
            cfg.internal_api_key.clone(),
            require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(payments::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(api_routes)
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
