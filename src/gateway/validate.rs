use crate::domain::checkout::CheckoutRequest;
use crate::domain::transaction::amount_minor_from_decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

/// Client-side checks run before any network call. Field-keyed messages,
/// never fails.
pub fn validate(req: &CheckoutRequest) -> Validation {
    let mut errors = BTreeMap::new();

    if req.order_id.trim().is_empty() {
        errors.insert("order_id".to_string(), "order id is required".to_string());
    }

    match amount_minor_from_decimal(&req.amount) {
        Some(minor) if minor > 0 => {}
        _ => {
            errors.insert(
                "amount".to_string(),
                "amount must be a positive decimal value".to_string(),
            );
        }
    }

    if req.customer_name.trim().is_empty() {
        errors.insert("customer_name".to_string(), "customer name is required".to_string());
    }

    if req.customer_email.trim().is_empty() {
        errors.insert("customer_email".to_string(), "customer email is required".to_string());
    } else if !email_shape(req.customer_email.trim()) {
        errors.insert(
            "customer_email".to_string(),
            "customer email is not a valid address".to_string(),
        );
    }

    if req.customer_phone.trim().is_empty() {
        errors.insert("customer_phone".to_string(), "customer phone is required".to_string());
    }

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

// Shape check equivalent to \S+@\S+\.\S+
fn email_shape(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(at) = value.find('@') else {
        return false;
    };
    let local = &value[..at];
    let domain = &value[at + 1..];
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_accepts_plain_addresses() {
        assert!(email_shape("a@b.com"));
        assert!(email_shape("asha.rahman@mail.example.bd"));
    }

    #[test]
    fn email_shape_rejects_degenerate_input() {
        assert!(!email_shape("a@b"));
        assert!(!email_shape("@b.com"));
        assert!(!email_shape("a b@c.com"));
        assert!(!email_shape("a@.com"));
        assert!(!email_shape("a@b."));
    }
}
