use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod store_redis;

/// Pending-transaction context written just before the browser leaves for the
/// gateway page. The slot holds at most one record; last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSession {
    pub merchant_transaction_id: String,
    pub transaction_id: Option<String>,
    pub amount_minor: i64,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrites any existing pending record.
    async fn save(&self, record: &PendingSession) -> anyhow::Result<()>;

    /// Reads and deletes the record. Returns None without error when the slot
    /// is empty; a second consume always returns None.
    async fn consume(&self) -> anyhow::Result<Option<PendingSession>>;
}
