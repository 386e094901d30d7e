use crate::error::ServiceError;
use serde::{Deserialize, Serialize};

pub mod eps;
pub mod mock;
pub mod validate;

#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub merchant_transaction_id: String,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_postcode: String,
    pub customer_country: String,
    pub product_name: String,
    pub product_category: String,
    pub success_url: String,
    pub fail_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateOutcome {
    pub transaction_id: String,
    pub merchant_transaction_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub status: String,
    pub merchant_transaction_id: String,
    pub amount_minor: Option<i64>,
    pub transaction_date: Option<String>,
    pub transaction_type: Option<String>,
    pub financial_entity: Option<String>,
    pub customer_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpsConfig {
    pub is_active: bool,
    pub is_sandbox: bool,
}

#[async_trait::async_trait]
pub trait EpsGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateOutcome, ServiceError>;

    async fn verify(&self, merchant_transaction_id: &str) -> Result<VerifyOutcome, ServiceError>;

    async fn fetch_config(&self) -> Result<EpsConfig, ServiceError>;
}
