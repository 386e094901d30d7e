pub mod config;
pub mod error;
pub mod domain {
    pub mod checkout;
    pub mod transaction;
}
pub mod gateway;
pub mod session;
pub mod reconcile {
    pub mod classify;
    pub mod reconciler;
}
pub mod tracking {
    pub mod event;
    pub mod order_store;
    pub mod sink;
    pub mod sources;
    pub mod tracker;
}
pub mod repo {
    pub mod transactions_repo;
}
pub mod service {
    pub mod checkout_flow;
    pub mod config_cache;
    pub mod payment_service;
}
pub mod http {
    pub mod handlers {
        pub mod callback;
        pub mod checkout;
        pub mod ops;
        pub mod status;
    }
    pub mod middleware {
        pub mod rate_limit;
    }
}

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub reconciler: reconcile::reconciler::CallbackReconciler,
    pub analytics_sink: Arc<dyn tracking::sink::AnalyticsSink>,
    pub order_stores: Vec<Arc<dyn tracking::order_store::OrderStore>>,
    pub redis_client: redis::Client,
}
