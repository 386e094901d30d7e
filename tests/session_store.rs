use mouza_payments::session::memory::MemorySessionStore;
use mouza_payments::session::{PendingSession, SessionStore};

fn record(id: &str, amount_minor: i64) -> PendingSession {
    PendingSession {
        merchant_transaction_id: id.to_string(),
        transaction_id: Some(format!("gwtxn_{}", id)),
        amount_minor,
        customer_email: "asha@example.com".to_string(),
        created_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn save_then_consume_round_trips() {
    let store = MemorySessionStore::new();
    let saved = record("M1", 50_000);
    store.save(&saved).await.unwrap();

    let consumed = store.consume().await.unwrap();
    assert_eq!(consumed, Some(saved));
}

#[tokio::test]
async fn second_consume_returns_none() {
    let store = MemorySessionStore::new();
    store.save(&record("M1", 50_000)).await.unwrap();

    assert!(store.consume().await.unwrap().is_some());
    assert_eq!(store.consume().await.unwrap(), None);
}

#[tokio::test]
async fn consume_on_empty_slot_is_not_an_error() {
    let store = MemorySessionStore::new();
    assert_eq!(store.consume().await.unwrap(), None);
}

#[tokio::test]
async fn save_overwrites_the_previous_record() {
    let store = MemorySessionStore::new();
    store.save(&record("M1", 50_000)).await.unwrap();
    store.save(&record("M2", 70_000)).await.unwrap();

    let consumed = store.consume().await.unwrap().unwrap();
    assert_eq!(consumed.merchant_transaction_id, "M2");
    assert_eq!(consumed.amount_minor, 70_000);
    assert_eq!(store.consume().await.unwrap(), None);
}
