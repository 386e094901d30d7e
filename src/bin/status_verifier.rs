use anyhow::Result;
use mouza_payments::config::AppConfig;
use mouza_payments::gateway::eps::EpsHttpGateway;
use mouza_payments::gateway::EpsGateway;
use mouza_payments::repo::transactions_repo::TransactionsRepo;
use mouza_payments::service::payment_service::record_verification;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

// Re-checks transactions stuck in a non-terminal state, for customers who
// never came back through the callback route.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let repo = TransactionsRepo { pool };
    let gateway = EpsHttpGateway {
        base_url: cfg.eps_base_url.clone(),
        merchant_id: cfg.eps_merchant_id.clone(),
        api_key: cfg.eps_api_key.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    };

    loop {
        let cutoff = chrono::Utc::now() - chrono::Duration::minutes(10);
        match repo.list_unresolved(cutoff, 50).await {
            Ok(stale) => {
                for transaction in stale {
                    let id = transaction.merchant_transaction_id.clone();
                    match gateway.verify(&id).await {
                        Ok(outcome) => {
                            if let Err(e) = record_verification(&repo, &id, &outcome).await {
                                tracing::warn!("could not record verification for {}: {:#}", id, e);
                            } else {
                                tracing::info!("re-verified {} -> {}", id, outcome.status);
                            }
                        }
                        Err(e) => tracing::warn!("re-verification of {} failed: {}", id, e),
                    }
                }
            }
            Err(e) => tracing::error!("could not list unresolved transactions: {:#}", e),
        }

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    }
}
