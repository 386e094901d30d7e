use crate::domain::checkout::CheckoutRequest;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn initialize(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    match state.payment_service.initiate(req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}
