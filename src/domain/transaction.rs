use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "BDT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Cancelled => "CANCELLED",
            TransactionStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> TransactionStatus {
        match s {
            "PENDING" => TransactionStatus::Pending,
            "PROCESSING" => TransactionStatus::Processing,
            "COMPLETED" => TransactionStatus::Completed,
            "CANCELLED" => TransactionStatus::Cancelled,
            "REFUNDED" => TransactionStatus::Refunded,
            _ => TransactionStatus::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed
                | TransactionStatus::Failed
                | TransactionStatus::Cancelled
                | TransactionStatus::Refunded
        )
    }

    /// Maps the gateway's own status vocabulary onto the local lifecycle.
    pub fn from_gateway(payment_status: &str) -> Option<TransactionStatus> {
        match payment_status.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "SUCCESSFUL" | "COMPLETED" => Some(TransactionStatus::Completed),
            "PROCESSING" | "INITIATED" => Some(TransactionStatus::Processing),
            "FAILED" | "FAILURE" | "DECLINED" => Some(TransactionStatus::Failed),
            "CANCEL" | "CANCELLED" => Some(TransactionStatus::Cancelled),
            "REFUNDED" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

/// Forward-only status progression. Returns the accepted next status, or
/// None when the transition is not allowed (including no-op re-assertion).
/// A transaction never returns to Pending once it has left it.
pub fn advance(current: TransactionStatus, next: TransactionStatus) -> Option<TransactionStatus> {
    if next == current {
        return None;
    }
    let allowed = match current {
        TransactionStatus::Pending => !matches!(next, TransactionStatus::Refunded),
        TransactionStatus::Processing => matches!(
            next,
            TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled
        ),
        TransactionStatus::Completed => matches!(next, TransactionStatus::Refunded),
        TransactionStatus::Failed | TransactionStatus::Cancelled | TransactionStatus::Refunded => false,
    };
    allowed.then_some(next)
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub merchant_transaction_id: String,
    pub gateway_transaction_id: Option<String>,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub status: TransactionStatus,
    pub payment_status: Option<String>,
    pub is_verified: bool,
    pub verification_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Parses a 2-decimal amount string ("500.00", "500.5", "500") into minor
/// units. Rejects negatives, empty input and more than two decimal places.
pub fn amount_minor_from_decimal(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() || whole.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || frac.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac_minor: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac_minor)
}

pub fn amount_decimal_from_minor(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_amounts() {
        assert_eq!(amount_minor_from_decimal("500.00"), Some(50_000));
        assert_eq!(amount_minor_from_decimal("500.5"), Some(50_050));
        assert_eq!(amount_minor_from_decimal("500"), Some(50_000));
        assert_eq!(amount_minor_from_decimal("0.05"), Some(5));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(amount_minor_from_decimal(""), None);
        assert_eq!(amount_minor_from_decimal("-5"), None);
        assert_eq!(amount_minor_from_decimal("5.123"), None);
        assert_eq!(amount_minor_from_decimal("abc"), None);
        assert_eq!(amount_minor_from_decimal("."), None);
    }

    #[test]
    fn formats_minor_units() {
        assert_eq!(amount_decimal_from_minor(50_000), "500.00");
        assert_eq!(amount_decimal_from_minor(5), "0.05");
    }
}
