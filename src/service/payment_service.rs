use crate::domain::checkout::{CheckoutRequest, CheckoutResponse, RedirectMode};
use crate::domain::transaction::{amount_minor_from_decimal, Transaction, TransactionStatus, CURRENCY};
use crate::error::ServiceError;
use crate::gateway::{EpsGateway, VerifyOutcome};
use crate::gateway::validate::validate;
use crate::reconcile::classify::CallbackOutcome;
use crate::reconcile::reconciler::Reconciliation;
use crate::repo::transactions_repo::{NewTransaction, TransactionsRepo};
use crate::service::checkout_flow::CheckoutFlow;
use crate::service::config_cache::EpsConfigCache;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    pub pool: PgPool,
    pub transactions_repo: TransactionsRepo,
    pub checkout: CheckoutFlow,
    pub gateway: Arc<dyn EpsGateway>,
    pub config_cache: EpsConfigCache,
}

impl PaymentService {
    pub async fn initiate(&self, req: CheckoutRequest) -> Result<CheckoutResponse, ServiceError> {
        let validation = validate(&req);
        if !validation.is_valid {
            return Err(ServiceError::Validation(validation.errors));
        }

        let config = self.config_cache.current().await?;
        if !config.is_active {
            return Err(ServiceError::Gateway(
                "online payments are currently disabled".to_string(),
            ));
        }

        let merchant_transaction_id = new_merchant_transaction_id();
        let outcome = self.checkout.start(&req, &merchant_transaction_id).await?;

        let amount_minor = amount_minor_from_decimal(&req.amount).unwrap_or_default();
        let record = NewTransaction {
            merchant_transaction_id: outcome.merchant_transaction_id.clone(),
            gateway_transaction_id: Some(outcome.transaction_id.clone()),
            order_id: req.order_id.clone(),
            amount_minor,
            currency: CURRENCY.to_string(),
            customer_name: req.customer_name.clone(),
            customer_email: req.customer_email.clone(),
            customer_phone: req.customer_phone.clone(),
            customer_address: req.customer_address.clone(),
            product_name: req.product_name.clone().or_else(|| req.package_name.clone()),
            product_category: req.product_category.clone(),
        };
        self.transactions_repo
            .insert_pending(&record)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        tracing::info!(
            "initialized payment {} for order {} ({} {})",
            outcome.merchant_transaction_id,
            req.order_id,
            req.amount,
            CURRENCY
        );

        Ok(CheckoutResponse {
            success: true,
            transaction_id: outcome.transaction_id,
            merchant_transaction_id: outcome.merchant_transaction_id,
            redirect_url: outcome.redirect_url,
            redirect_mode: if req.new_window {
                RedirectMode::NewWindow
            } else {
                RedirectMode::SameWindow
            },
        })
    }

    /// Manual re-verify: always asks the gateway, then records the answer
    /// locally on a best-effort basis. Unlimited manual retries.
    pub async fn verify(&self, merchant_transaction_id: &str) -> Result<VerifyOutcome, ServiceError> {
        let outcome = self.gateway.verify(merchant_transaction_id).await?;
        if let Err(e) = record_verification(&self.transactions_repo, merchant_transaction_id, &outcome).await {
            tracing::warn!(
                "failed to record verification for {}: {:#}",
                merchant_transaction_id,
                e
            );
        }
        Ok(outcome)
    }

    pub async fn status(&self, merchant_transaction_id: &str) -> Result<Transaction, ServiceError> {
        match self.transactions_repo.find(merchant_transaction_id).await {
            Ok(Some(transaction)) => Ok(transaction),
            Ok(None) => Err(ServiceError::NotFound(format!(
                "transaction {} not found",
                merchant_transaction_id
            ))),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    /// Persists the result of a callback reconciliation. The outcome was
    /// already determined; failures here are the caller's to log, not to show
    /// the user.
    pub async fn apply_callback(&self, reconciliation: &Reconciliation) -> anyhow::Result<()> {
        let Some(id) = &reconciliation.merchant_transaction_id else {
            tracing::warn!("callback without a correlation id; nothing to persist");
            return Ok(());
        };

        if self.transactions_repo.find(id).await?.is_none() {
            tracing::warn!("callback for unknown transaction {}", id);
            return Ok(());
        }

        let target = match reconciliation.outcome {
            CallbackOutcome::Success => TransactionStatus::Completed,
            CallbackOutcome::Cancel => TransactionStatus::Cancelled,
            CallbackOutcome::Fail => TransactionStatus::Failed,
        };
        self.transactions_repo.advance_status(id, target).await?;

        if let Some(verification) = &reconciliation.verification {
            record_verification(&self.transactions_repo, id, verification).await?;
        }

        Ok(())
    }
}

/// Shared between the service and the background verifier. The verified
/// amount must equal the stored amount; on mismatch the answer is kept for
/// inspection but the transaction is not marked verified.
pub async fn record_verification(
    repo: &TransactionsRepo,
    merchant_transaction_id: &str,
    outcome: &VerifyOutcome,
) -> anyhow::Result<()> {
    let Some(stored) = repo.find(merchant_transaction_id).await? else {
        tracing::warn!("verification for unknown transaction {}", merchant_transaction_id);
        return Ok(());
    };

    let amount_ok = outcome
        .amount_minor
        .map_or(true, |amount| amount == stored.amount_minor);
    if !amount_ok {
        tracing::warn!(
            "verified amount mismatch for {}: stored {} gateway {:?}",
            merchant_transaction_id,
            stored.amount_minor,
            outcome.amount_minor
        );
    }

    repo.record_verification(
        merchant_transaction_id,
        &outcome.status,
        amount_ok,
        &serde_json::to_value(outcome)?,
    )
    .await?;

    if amount_ok {
        if let Some(refined) = TransactionStatus::from_gateway(&outcome.status) {
            repo.advance_status(merchant_transaction_id, refined).await?;
        }
    }

    Ok(())
}

pub fn new_merchant_transaction_id() -> String {
    format!("EPS{}", Uuid::new_v4().simple())
}
