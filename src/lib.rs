pub mod config;
pub mod domain {
    pub mod notification;
    pub mod payment;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
    }
    pub mod middleware {
        pub mod admin_auth;
        pub mod rate_limit;
    }
}
pub mod messaging;
pub mod repo {
    pub mod payments_repo;
}
pub mod service {
    pub mod notification_dispatcher;
    pub mod payment_service;
    pub mod record_builder;
    pub mod templates;
    pub mod ttl_cache;
}
pub mod signature;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub redis_client: redis::Client,
    pub config: config::AppConfig,
}
