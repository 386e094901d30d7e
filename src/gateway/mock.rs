use crate::error::ServiceError;
use crate::gateway::{EpsConfig, EpsGateway, InitiateOutcome, InitiateRequest, VerifyOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockEpsGateway {
    pub behavior: String,
    pub redirect_base: String,
    pub verify_status: String,
    pub verify_amount_minor: Option<i64>,
    pub is_active: bool,
    pub initiate_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
}

impl MockEpsGateway {
    pub fn success(redirect_base: &str) -> Self {
        Self {
            behavior: "ALWAYS_SUCCESS".to_string(),
            redirect_base: redirect_base.to_string(),
            verify_status: "SUCCESS".to_string(),
            verify_amount_minor: None,
            is_active: true,
            initiate_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message_behavior: &str) -> Self {
        Self {
            behavior: message_behavior.to_string(),
            ..Self::success("https://gw/pay")
        }
    }
}

#[async_trait::async_trait]
impl EpsGateway for MockEpsGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateOutcome, ServiceError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior.as_str() {
            "ALWAYS_FAILURE" => Err(ServiceError::Gateway("mock decline".to_string())),
            "ALWAYS_TIMEOUT" => Err(ServiceError::Transport("payment gateway timed out".to_string())),
            _ => Ok(InitiateOutcome {
                transaction_id: format!("gwtxn_{}", request.merchant_transaction_id),
                merchant_transaction_id: request.merchant_transaction_id.clone(),
                redirect_url: format!("{}/{}", self.redirect_base, request.merchant_transaction_id),
            }),
        }
    }

    async fn verify(&self, merchant_transaction_id: &str) -> Result<VerifyOutcome, ServiceError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VerifyOutcome {
            status: self.verify_status.clone(),
            merchant_transaction_id: merchant_transaction_id.to_string(),
            amount_minor: self.verify_amount_minor,
            transaction_date: None,
            transaction_type: Some("SALE".to_string()),
            financial_entity: Some("MOCK_BANK".to_string()),
            customer_info: None,
        })
    }

    async fn fetch_config(&self) -> Result<EpsConfig, ServiceError> {
        Ok(EpsConfig {
            is_active: self.is_active,
            is_sandbox: true,
        })
    }
}
