use mouza_payments::domain::transaction::{advance, TransactionStatus};

#[test]
fn pending_moves_forward() {
    assert_eq!(
        advance(TransactionStatus::Pending, TransactionStatus::Processing),
        Some(TransactionStatus::Processing)
    );
    assert_eq!(
        advance(TransactionStatus::Pending, TransactionStatus::Completed),
        Some(TransactionStatus::Completed)
    );
    assert_eq!(
        advance(TransactionStatus::Pending, TransactionStatus::Cancelled),
        Some(TransactionStatus::Cancelled)
    );
}

#[test]
fn never_returns_to_pending() {
    for current in [
        TransactionStatus::Processing,
        TransactionStatus::Completed,
        TransactionStatus::Failed,
        TransactionStatus::Cancelled,
        TransactionStatus::Refunded,
    ] {
        assert_eq!(advance(current, TransactionStatus::Pending), None);
    }
}

#[test]
fn reasserting_the_same_status_is_a_no_op() {
    assert_eq!(advance(TransactionStatus::Completed, TransactionStatus::Completed), None);
    assert_eq!(advance(TransactionStatus::Pending, TransactionStatus::Pending), None);
}

#[test]
fn only_completed_can_be_refunded() {
    assert_eq!(
        advance(TransactionStatus::Completed, TransactionStatus::Refunded),
        Some(TransactionStatus::Refunded)
    );
    assert_eq!(advance(TransactionStatus::Failed, TransactionStatus::Refunded), None);
    assert_eq!(advance(TransactionStatus::Cancelled, TransactionStatus::Refunded), None);
}

#[test]
fn terminal_states_do_not_flip_between_each_other() {
    assert_eq!(advance(TransactionStatus::Completed, TransactionStatus::Failed), None);
    assert_eq!(advance(TransactionStatus::Failed, TransactionStatus::Completed), None);
    assert_eq!(advance(TransactionStatus::Cancelled, TransactionStatus::Completed), None);
}

#[test]
fn gateway_vocabulary_maps_onto_local_lifecycle() {
    assert_eq!(
        TransactionStatus::from_gateway("success"),
        Some(TransactionStatus::Completed)
    );
    assert_eq!(
        TransactionStatus::from_gateway("CANCELLED"),
        Some(TransactionStatus::Cancelled)
    );
    assert_eq!(TransactionStatus::from_gateway("mystery"), None);
}
