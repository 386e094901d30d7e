use crate::domain::transaction::CURRENCY;
use crate::reconcile::classify::ReturnParams;
use crate::tracking::order_store::PendingOrder;

/// Last-resort reconstruction from the return URL alone. A zero or absent
/// amount yields nothing; a zero-value purchase event would be worse than no
/// event.
pub fn order_from_params(params: &ReturnParams) -> Option<PendingOrder> {
    let amount_minor = params.amount_minor.filter(|a| *a > 0)?;
    Some(PendingOrder {
        merchant_transaction_id: params.merchant_transaction_id.clone(),
        amount_minor,
        currency: CURRENCY.to_string(),
        package_name: params.package_name.clone(),
        files: Vec::new(),
    })
}

/// Ordered source probing: the first usable candidate wins.
pub fn first_usable(candidates: Vec<Option<PendingOrder>>) -> Option<PendingOrder> {
    candidates.into_iter().flatten().find(PendingOrder::is_usable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(amount_minor: i64) -> PendingOrder {
        PendingOrder {
            merchant_transaction_id: None,
            amount_minor,
            currency: CURRENCY.to_string(),
            package_name: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn first_usable_skips_empty_and_zero_value_candidates() {
        let picked = first_usable(vec![None, Some(order(0)), Some(order(50_000)), Some(order(10))]);
        assert_eq!(picked.map(|o| o.amount_minor), Some(50_000));
    }

    #[test]
    fn params_reconstruction_requires_positive_amount() {
        let empty = ReturnParams::default();
        assert!(order_from_params(&empty).is_none());

        let zero = ReturnParams {
            amount_minor: Some(0),
            ..ReturnParams::default()
        };
        assert!(order_from_params(&zero).is_none());

        let usable = ReturnParams {
            amount_minor: Some(50_000),
            package_name: Some("Dhaka CS bundle".to_string()),
            ..ReturnParams::default()
        };
        let order = order_from_params(&usable).unwrap();
        assert_eq!(order.amount_minor, 50_000);
        assert_eq!(order.package_name.as_deref(), Some("Dhaka CS bundle"));
    }
}
