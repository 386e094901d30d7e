use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use mouza_payments::config::AppConfig;
use mouza_payments::gateway::eps::EpsHttpGateway;
use mouza_payments::gateway::EpsGateway;
use mouza_payments::reconcile::reconciler::CallbackReconciler;
use mouza_payments::repo::transactions_repo::TransactionsRepo;
use mouza_payments::service::checkout_flow::{CheckoutFlow, ReturnUrls};
use mouza_payments::service::config_cache::EpsConfigCache;
use mouza_payments::service::payment_service::PaymentService;
use mouza_payments::session::store_redis::RedisSessionStore;
use mouza_payments::session::SessionStore;
use mouza_payments::tracking::order_store::{OrderStore, RedisOrderStore};
use mouza_payments::tracking::sink::{AnalyticsSink, RedisStreamSink};
use mouza_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    let gateway: Arc<dyn EpsGateway> = Arc::new(EpsHttpGateway {
        base_url: cfg.eps_base_url.clone(),
        merchant_id: cfg.eps_merchant_id.clone(),
        api_key: cfg.eps_api_key.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    });

    let sessions: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(
        redis::Client::open(cfg.redis_url.clone())?,
        "payment",
    ));
    let order_stores: Vec<Arc<dyn OrderStore>> = vec![
        Arc::new(RedisOrderStore::new(
            redis::Client::open(cfg.redis_url.clone())?,
            "payment:pending_order",
        )),
        Arc::new(RedisOrderStore::new(
            redis::Client::open(cfg.redis_url.clone())?,
            "payment:pending_order_backup",
        )),
    ];
    let analytics_sink: Arc<dyn AnalyticsSink> = Arc::new(RedisStreamSink {
        client: redis::Client::open(cfg.redis_url.clone())?,
        stream_key: cfg.analytics_stream_key.clone(),
    });

    let transactions_repo = TransactionsRepo { pool: pool.clone() };
    let config_cache = EpsConfigCache::new(gateway.clone(), std::time::Duration::from_secs(300));

    let checkout = CheckoutFlow {
        gateway: gateway.clone(),
        sessions: sessions.clone(),
        orders: order_stores.clone(),
        return_urls: ReturnUrls::from_base(&cfg.public_base_url),
    };

    let payment_service = PaymentService {
        pool: pool.clone(),
        transactions_repo,
        checkout,
        gateway: gateway.clone(),
        config_cache,
    };

    let reconciler = CallbackReconciler {
        gateway,
        sessions,
        routes: cfg.outcome_routes(),
    };

    let state = AppState {
        payment_service,
        reconciler,
        analytics_sink,
        order_stores,
        redis_client,
    };

    let checkout_routes = Router::new()
        .route(
            "/payment/eps/initialize/",
            post(mouza_payments::http::handlers::checkout::initialize),
        )
        .layer(from_fn_with_state(
            mouza_payments::http::middleware::rate_limit::RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: cfg.checkout_rate_limit_per_minute,
            },
            mouza_payments::http::middleware::rate_limit::enforce,
        ));

    let app = Router::new()
        .route("/health", get(mouza_payments::http::handlers::ops::health))
        .route(
            "/payment/eps/callback/",
            get(mouza_payments::http::handlers::callback::callback),
        )
        .route(
            "/payment/eps/verify/:merchant_transaction_id/",
            get(mouza_payments::http::handlers::status::verify),
        )
        .route(
            "/payment/eps/status/:merchant_transaction_id/",
            get(mouza_payments::http::handlers::status::get_status),
        )
        .route(
            "/payment/eps/status/",
            get(mouza_payments::http::handlers::status::missing_transaction_id),
        )
        .route(
            "/payment/eps/config/",
            get(mouza_payments::http::handlers::status::get_config),
        )
        .route("/ops/readiness", get(mouza_payments::http::handlers::ops::readiness))
        .route("/ops/liveness", get(mouza_payments::http::handlers::ops::liveness))
        .merge(checkout_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
