use crate::domain::transaction::amount_decimal_from_minor;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn get_status(
    State(state): State<AppState>,
    Path(merchant_transaction_id): Path<String>,
) -> impl IntoResponse {
    match state.payment_service.status(&merchant_transaction_id).await {
        Ok(transaction) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"success": true, "transaction": transaction})),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// Registered on the id-less status path so "no transaction id supplied" stays
// distinct from "transaction not found".
pub async fn missing_transaction_id() -> impl IntoResponse {
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": {
                "code": "MISSING_TRANSACTION_ID",
                "message": "a transaction id is required",
                "details": null
            }
        })),
    )
        .into_response()
}

pub async fn verify(
    State(state): State<AppState>,
    Path(merchant_transaction_id): Path<String>,
) -> impl IntoResponse {
    match state.payment_service.verify(&merchant_transaction_id).await {
        Ok(outcome) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "status": outcome.status,
                "merchant_transaction_id": outcome.merchant_transaction_id,
                "total_amount": outcome.amount_minor.map(amount_decimal_from_minor),
                "transaction_date": outcome.transaction_date,
                "transaction_type": outcome.transaction_type,
                "financial_entity": outcome.financial_entity,
                "customer_info": outcome.customer_info,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    match state.payment_service.config_cache.current().await {
        Ok(config) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"success": true, "config": config})),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
