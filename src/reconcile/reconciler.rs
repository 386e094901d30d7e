use crate::error::ServiceError;
use crate::gateway::{EpsGateway, VerifyOutcome};
use crate::reconcile::classify::{classify, CallbackOutcome, ReturnParams};
use crate::session::{PendingSession, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// How long the interstitial page waits before navigating to the outcome
/// route.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct OutcomeRoutes {
    pub success: String,
    pub cancelled: String,
    pub failed: String,
    pub error: String,
}

impl Default for OutcomeRoutes {
    fn default() -> Self {
        Self {
            success: "/payment/success".to_string(),
            cancelled: "/payment/cancelled".to_string(),
            failed: "/payment/failed".to_string(),
            error: "/payment/error".to_string(),
        }
    }
}

impl OutcomeRoutes {
    pub fn for_outcome(&self, outcome: CallbackOutcome) -> &str {
        match outcome {
            CallbackOutcome::Success => &self.success,
            CallbackOutcome::Cancel => &self.cancelled,
            CallbackOutcome::Fail => &self.failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectPlan {
    pub route: String,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct Reconciliation {
    pub outcome: CallbackOutcome,
    pub merchant_transaction_id: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub amount_minor: Option<i64>,
    pub session: Option<PendingSession>,
    pub verification: Option<VerifyOutcome>,
    pub redirect: RedirectPlan,
}

#[derive(Clone)]
pub struct CallbackReconciler {
    pub gateway: Arc<dyn EpsGateway>,
    pub sessions: Arc<dyn SessionStore>,
    pub routes: OutcomeRoutes,
}

impl CallbackReconciler {
    /// Produces the single authoritative classification of a payment attempt
    /// on return from the gateway. Internal failures surface as a distinct
    /// processing-error state, never as a payment failure.
    pub async fn reconcile(&self, params: &ReturnParams) -> Result<Reconciliation, ServiceError> {
        match self.run(params).await {
            Ok(reconciliation) => Ok(reconciliation),
            Err(e) => {
                tracing::error!("callback reconciliation failed: {:#}", e);
                Err(ServiceError::Reconciliation(
                    "could not determine the payment result".to_string(),
                ))
            }
        }
    }

    async fn run(&self, params: &ReturnParams) -> anyhow::Result<Reconciliation> {
        let outcome = classify(params.status.as_deref());
        if outcome == CallbackOutcome::Fail {
            if let Some(raw) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
                if raw.trim().to_ascii_lowercase() != "fail" {
                    tracing::warn!("unrecognized return status {:?}, classified as failure", raw);
                }
            }
        }

        // The stored session is consumed before any verify call: the
        // correlation id may only exist in it. It is context, never the
        // source of the outcome.
        let session = self.sessions.consume().await?;

        let merchant_transaction_id = params
            .merchant_transaction_id
            .clone()
            .or_else(|| session.as_ref().map(|s| s.merchant_transaction_id.clone()));
        let gateway_transaction_id = params
            .gateway_transaction_id
            .clone()
            .or_else(|| session.as_ref().and_then(|s| s.transaction_id.clone()));
        let amount_minor = params
            .amount_minor
            .or_else(|| session.as_ref().map(|s| s.amount_minor));

        // One advisory verify call; its failure never changes the outcome
        // already determined from the redirect status.
        let verification = match &merchant_transaction_id {
            Some(id) => match self.gateway.verify(id).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    tracing::warn!("verification for {} failed: {}", id, e);
                    None
                }
            },
            None => None,
        };

        let redirect = RedirectPlan {
            route: self.routes.for_outcome(outcome).to_string(),
            delay: REDIRECT_DELAY,
        };

        Ok(Reconciliation {
            outcome,
            merchant_transaction_id,
            gateway_transaction_id,
            amount_minor,
            session,
            verification,
            redirect,
        })
    }
}
