use mouza_payments::reconcile::classify::{classify, CallbackOutcome};

#[test]
fn classification_is_total() {
    let cases = [
        (Some("success"), CallbackOutcome::Success),
        (Some("cancel"), CallbackOutcome::Cancel),
        (Some("xyz"), CallbackOutcome::Fail),
        (Some(""), CallbackOutcome::Fail),
        (None, CallbackOutcome::Fail),
    ];
    for (status, expected) in cases {
        assert_eq!(classify(status), expected, "status {:?}", status);
    }
}

#[test]
fn classification_ignores_case_and_padding() {
    assert_eq!(classify(Some(" SUCCESS ")), CallbackOutcome::Success);
    assert_eq!(classify(Some("Cancel")), CallbackOutcome::Cancel);
}

#[test]
fn future_status_values_default_to_fail() {
    // A new gateway vocabulary word must never leave a dangling outcome.
    for unknown in ["refund_pending", "hold", "0", "null"] {
        assert_eq!(classify(Some(unknown)), CallbackOutcome::Fail);
    }
}
