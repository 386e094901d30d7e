use mouza_payments::domain::checkout::CheckoutRequest;
use mouza_payments::gateway::mock::MockEpsGateway;
use mouza_payments::reconcile::classify::{CallbackOutcome, ReturnParams};
use mouza_payments::reconcile::reconciler::{CallbackReconciler, OutcomeRoutes, REDIRECT_DELAY};
use mouza_payments::service::checkout_flow::{CheckoutFlow, ReturnUrls};
use mouza_payments::session::memory::MemorySessionStore;
use mouza_payments::session::{PendingSession, SessionStore};
use mouza_payments::tracking::order_store::{MemoryOrderStore, OrderStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        order_id: "O1".to_string(),
        amount: "500.00".to_string(),
        customer_name: "Asha Rahman".to_string(),
        customer_email: "asha@example.com".to_string(),
        customer_phone: "01712345678".to_string(),
        ..CheckoutRequest::default()
    }
}

fn session(id: &str) -> PendingSession {
    PendingSession {
        merchant_transaction_id: id.to_string(),
        transaction_id: Some(format!("gwtxn_{}", id)),
        amount_minor: 50_000,
        customer_email: "asha@example.com".to_string(),
        created_at: chrono::Utc::now(),
    }
}

fn reconciler(
    gateway: Arc<MockEpsGateway>,
    sessions: Arc<MemorySessionStore>,
) -> CallbackReconciler {
    CallbackReconciler {
        gateway,
        sessions,
        routes: OutcomeRoutes::default(),
    }
}

#[tokio::test]
async fn initialize_writes_the_session_slot_and_returns_the_gateway_target() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());
    let orders = Arc::new(MemoryOrderStore::new());

    let flow = CheckoutFlow {
        gateway: gateway.clone(),
        sessions: sessions.clone(),
        orders: vec![orders.clone()],
        return_urls: ReturnUrls::from_base("https://maps.example.bd"),
    };

    let outcome = flow.start(&checkout_request(), "M1").await.unwrap();
    assert_eq!(outcome.merchant_transaction_id, "M1");
    assert_eq!(outcome.redirect_url, "https://gw/pay/M1");

    let stored = sessions.consume().await.unwrap().unwrap();
    assert_eq!(stored.merchant_transaction_id, "M1");
    assert_eq!(stored.amount_minor, 50_000);
    assert_eq!(stored.customer_email, "asha@example.com");

    let order = orders.consume().await.unwrap().unwrap();
    assert_eq!(order.merchant_transaction_id.as_deref(), Some("M1"));
    assert_eq!(order.amount_minor, 50_000);
}

#[tokio::test]
async fn gateway_failure_leaves_the_session_slot_empty() {
    let gateway = Arc::new(MockEpsGateway::failing("ALWAYS_FAILURE"));
    let sessions = Arc::new(MemorySessionStore::new());

    let flow = CheckoutFlow {
        gateway,
        sessions: sessions.clone(),
        orders: Vec::new(),
        return_urls: ReturnUrls::from_base("https://maps.example.bd"),
    };

    assert!(flow.start(&checkout_request(), "M1").await.is_err());
    assert!(sessions.consume().await.unwrap().is_none());
}

#[tokio::test]
async fn success_callback_consumes_the_session_and_verifies_once() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());
    sessions.save(&session("M1")).await.unwrap();

    let reconciler = reconciler(gateway.clone(), sessions.clone());
    let params = ReturnParams {
        status: Some("success".to_string()),
        merchant_transaction_id: Some("M1".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.outcome, CallbackOutcome::Success);
    assert_eq!(out.merchant_transaction_id.as_deref(), Some("M1"));
    assert!(out.session.is_some());
    assert!(out.verification.is_some());
    assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);

    // The slot was consumed during reconciliation.
    assert!(sessions.consume().await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_without_correlation_id_skips_verification() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());

    let reconciler = reconciler(gateway.clone(), sessions);
    let params = ReturnParams {
        status: Some("cancel".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.outcome, CallbackOutcome::Cancel);
    assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 0);
    assert_eq!(out.redirect.route, "/payment/cancelled");
    assert_eq!(out.redirect.delay, REDIRECT_DELAY);
}

#[tokio::test]
async fn unknown_status_routes_to_the_failed_screen() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());

    let reconciler = reconciler(gateway, sessions);
    let params = ReturnParams {
        status: Some("xyz".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.outcome, CallbackOutcome::Fail);
    assert_eq!(out.redirect.route, "/payment/failed");
}

#[tokio::test]
async fn session_supplies_a_missing_correlation_id() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());
    sessions.save(&session("M9")).await.unwrap();

    let reconciler = reconciler(gateway.clone(), sessions);
    let params = ReturnParams {
        status: Some("success".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.merchant_transaction_id.as_deref(), Some("M9"));
    assert_eq!(out.amount_minor, Some(50_000));
    assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn url_parameters_override_session_context() {
    let gateway = Arc::new(MockEpsGateway::success("https://gw/pay"));
    let sessions = Arc::new(MemorySessionStore::new());
    sessions.save(&session("M1")).await.unwrap();

    let reconciler = reconciler(gateway, sessions);
    // The stored record belongs to M1, but the gateway redirected back with
    // an explicit cancel; the URL's own status wins.
    let params = ReturnParams {
        status: Some("cancel".to_string()),
        merchant_transaction_id: Some("M1".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.outcome, CallbackOutcome::Cancel);
}

#[tokio::test]
async fn failed_verification_does_not_change_the_outcome() {
    struct VerifyRefused {
        inner: MockEpsGateway,
    }

    #[async_trait::async_trait]
    impl mouza_payments::gateway::EpsGateway for VerifyRefused {
        fn name(&self) -> &'static str {
            "verify-refused"
        }

        async fn initiate(
            &self,
            request: &mouza_payments::gateway::InitiateRequest,
        ) -> Result<mouza_payments::gateway::InitiateOutcome, mouza_payments::error::ServiceError> {
            self.inner.initiate(request).await
        }

        async fn verify(
            &self,
            merchant_transaction_id: &str,
        ) -> Result<mouza_payments::gateway::VerifyOutcome, mouza_payments::error::ServiceError> {
            let _ = self.inner.verify(merchant_transaction_id).await;
            Err(mouza_payments::error::ServiceError::Transport(
                "verify endpoint unreachable".to_string(),
            ))
        }

        async fn fetch_config(
            &self,
        ) -> Result<mouza_payments::gateway::EpsConfig, mouza_payments::error::ServiceError> {
            self.inner.fetch_config().await
        }
    }

    let gateway = Arc::new(VerifyRefused {
        inner: MockEpsGateway::success("https://gw/pay"),
    });
    let sessions = Arc::new(MemorySessionStore::new());
    sessions.save(&session("M1")).await.unwrap();

    let reconciler = CallbackReconciler {
        gateway,
        sessions,
        routes: OutcomeRoutes::default(),
    };
    let params = ReturnParams {
        status: Some("success".to_string()),
        merchant_transaction_id: Some("M1".to_string()),
        ..ReturnParams::default()
    };

    let out = reconciler.reconcile(&params).await.unwrap();
    assert_eq!(out.outcome, CallbackOutcome::Success);
    assert!(out.verification.is_none());
}
