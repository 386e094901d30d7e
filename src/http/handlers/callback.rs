use crate::reconcile::classify::{parse_return_params, CallbackOutcome};
use crate::reconcile::reconciler::{RedirectPlan, REDIRECT_DELAY};
use crate::tracking::tracker::PurchaseTracker;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use std::collections::HashMap;

pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let params = parse_return_params(&query);

    let reconciliation = match state.reconciler.reconcile(&params).await {
        Ok(r) => r,
        Err(_) => {
            let plan = RedirectPlan {
                route: state.reconciler.routes.error.clone(),
                delay: REDIRECT_DELAY,
            };
            return interstitial(
                "Payment processing error",
                "We could not determine your payment result. Please check your order status or contact support.",
                &plan,
            );
        }
    };

    if reconciliation.outcome == CallbackOutcome::Success {
        let tracker = PurchaseTracker::new(state.analytics_sink.clone(), state.order_stores.clone());
        match tracker.track(None, &params).await {
            Ok(tracking) => tracing::info!("purchase tracking: {:?}", tracking),
            Err(e) => tracing::warn!("purchase tracking failed: {:#}", e),
        }
    }

    if let Err(e) = state.payment_service.apply_callback(&reconciliation).await {
        tracing::error!("failed to persist callback result: {:#}", e);
    }

    let (title, message) = match reconciliation.outcome {
        CallbackOutcome::Success => (
            "Payment successful",
            "Your payment was received. You are being taken to your downloads.",
        ),
        CallbackOutcome::Cancel => (
            "Payment cancelled",
            "You cancelled the payment. No money was taken.",
        ),
        CallbackOutcome::Fail => (
            "Payment failed",
            "The payment did not complete. You can try again or contact support.",
        ),
    };

    interstitial(title, message, &reconciliation.redirect)
}

fn interstitial(title: &str, message: &str, plan: &RedirectPlan) -> axum::response::Response {
    let delay = plan.delay.as_secs();
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{delay};url={route}\">\n\
         <title>{title}</title>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p>{message}</p>\n\
         <p><a href=\"{route}\">Continue</a></p>\n</body>\n</html>\n",
        delay = delay,
        route = plan.route,
        title = title,
        message = message,
    );
    Html(body).into_response()
}
