use crate::domain::transaction::amount_minor_from_decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackOutcome {
    Success,
    Cancel,
    Fail,
}

/// Three-way classification of the gateway's return status. Total: anything
/// that is not an explicit success or cancel is treated as a failure.
pub fn classify(status: Option<&str>) -> CallbackOutcome {
    match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("success") => CallbackOutcome::Success,
        Some("cancel") => CallbackOutcome::Cancel,
        _ => CallbackOutcome::Fail,
    }
}

/// Everything the gateway hands back on the return URL. All fields are
/// optional; the reconciler copes with whatever survived the redirect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnParams {
    pub status: Option<String>,
    pub merchant_transaction_id: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub amount_minor: Option<i64>,
    pub file_count: Option<u32>,
    pub package_name: Option<String>,
}

pub fn parse_return_params(query: &HashMap<String, String>) -> ReturnParams {
    // The correlation id has shipped under two different parameter names.
    let merchant_transaction_id = query
        .get("transaction")
        .or_else(|| query.get("merchantTransactionId"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    ReturnParams {
        status: query.get("status").cloned(),
        merchant_transaction_id,
        gateway_transaction_id: query
            .get("transactionId")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        amount_minor: query.get("amount").and_then(|s| amount_minor_from_decimal(s)),
        file_count: query.get("files").and_then(|s| s.trim().parse().ok()),
        package_name: query
            .get("package")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    }
}
