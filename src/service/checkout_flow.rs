use crate::domain::checkout::CheckoutRequest;
use crate::domain::transaction::{amount_minor_from_decimal, CURRENCY};
use crate::error::ServiceError;
use crate::gateway::{EpsGateway, InitiateOutcome, InitiateRequest};
use crate::session::{PendingSession, SessionStore};
use crate::tracking::order_store::{OrderStore, PendingOrder};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ReturnUrls {
    pub success_url: String,
    pub fail_url: String,
    pub cancel_url: String,
}

impl ReturnUrls {
    /// All three point at the callback route; the gateway appends its own
    /// status and transaction parameters.
    pub fn from_base(public_base_url: &str) -> Self {
        let callback = format!("{}/payment/eps/callback/", public_base_url.trim_end_matches('/'));
        Self {
            success_url: callback.clone(),
            fail_url: callback.clone(),
            cancel_url: callback,
        }
    }
}

/// The redirect protocol: gateway initialize plus the state that has to
/// survive the full-page navigation. Everything in memory is lost once the
/// browser leaves, so the pending-session and pending-order slots are written
/// before the caller is handed the redirect URL.
#[derive(Clone)]
pub struct CheckoutFlow {
    pub gateway: Arc<dyn EpsGateway>,
    pub sessions: Arc<dyn SessionStore>,
    pub orders: Vec<Arc<dyn OrderStore>>,
    pub return_urls: ReturnUrls,
}

impl CheckoutFlow {
    pub async fn start(
        &self,
        req: &CheckoutRequest,
        merchant_transaction_id: &str,
    ) -> Result<InitiateOutcome, ServiceError> {
        let amount_minor = amount_minor_from_decimal(&req.amount)
            .filter(|a| *a > 0)
            .ok_or_else(|| {
                let mut errors = BTreeMap::new();
                errors.insert(
                    "amount".to_string(),
                    "amount must be a positive decimal value".to_string(),
                );
                ServiceError::Validation(errors)
            })?;

        let request = build_initiate_request(req, merchant_transaction_id, amount_minor, &self.return_urls);
        let outcome = self.gateway.initiate(&request).await?;

        let session = PendingSession {
            merchant_transaction_id: outcome.merchant_transaction_id.clone(),
            transaction_id: Some(outcome.transaction_id.clone()),
            amount_minor,
            customer_email: req.customer_email.clone(),
            created_at: chrono::Utc::now(),
        };
        self.sessions
            .save(&session)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let order = PendingOrder {
            merchant_transaction_id: Some(outcome.merchant_transaction_id.clone()),
            amount_minor,
            currency: CURRENCY.to_string(),
            package_name: req.package_name.clone(),
            files: req.files.clone(),
        };
        for store in &self.orders {
            store
                .save(&order)
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        Ok(outcome)
    }
}

pub fn build_initiate_request(
    req: &CheckoutRequest,
    merchant_transaction_id: &str,
    amount_minor: i64,
    return_urls: &ReturnUrls,
) -> InitiateRequest {
    InitiateRequest {
        merchant_transaction_id: merchant_transaction_id.to_string(),
        order_id: req.order_id.clone(),
        amount_minor,
        currency: CURRENCY.to_string(),
        customer_name: req.customer_name.clone(),
        customer_email: req.customer_email.clone(),
        customer_phone: req.customer_phone.clone(),
        customer_address: req.customer_address.clone().unwrap_or_default(),
        customer_city: req.customer_city.clone().unwrap_or_else(|| "Dhaka".to_string()),
        customer_postcode: req.customer_postcode.clone().unwrap_or_else(|| "1000".to_string()),
        customer_country: "BD".to_string(),
        product_name: req
            .product_name
            .clone()
            .or_else(|| req.package_name.clone())
            .unwrap_or_else(|| "Mouza map files".to_string()),
        product_category: req.product_category.clone().unwrap_or_else(|| "map".to_string()),
        success_url: return_urls.success_url.clone(),
        fail_url: return_urls.fail_url.clone(),
        cancel_url: return_urls.cancel_url.clone(),
    }
}
