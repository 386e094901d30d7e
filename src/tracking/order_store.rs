use crate::domain::checkout::PurchasedFile;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Order context written at checkout so the purchase event can be built after
/// the redirect round-trip. Deleted on first read; a repeat navigation finds
/// nothing and must not re-emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub merchant_transaction_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub package_name: Option<String>,
    pub files: Vec<PurchasedFile>,
}

impl PendingOrder {
    pub fn is_usable(&self) -> bool {
        self.amount_minor > 0
    }
}

#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    async fn save(&self, order: &PendingOrder) -> anyhow::Result<()>;

    /// Read-and-delete; None without error when empty.
    async fn consume(&self) -> anyhow::Result<Option<PendingOrder>>;
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    slot: Arc<Mutex<Option<PendingOrder>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    async fn save(&self, order: &PendingOrder) -> anyhow::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow::anyhow!("order slot poisoned"))?;
        *slot = Some(order.clone());
        Ok(())
    }

    async fn consume(&self) -> anyhow::Result<Option<PendingOrder>> {
        let mut slot = self.slot.lock().map_err(|_| anyhow::anyhow!("order slot poisoned"))?;
        Ok(slot.take())
    }
}

pub struct RedisOrderStore {
    pub client: redis::Client,
    pub key: String,
}

impl RedisOrderStore {
    pub fn new(client: redis::Client, key: &str) -> Self {
        Self {
            client,
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl OrderStore for RedisOrderStore {
    async fn save(&self, order: &PendingOrder) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(order)?;
        let _: () = redis::cmd("SET")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn consume(&self) -> anyhow::Result<Option<PendingOrder>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = redis::cmd("GETDEL")
            .arg(&self.key)
            .query_async(&mut conn)
            .await?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        match serde_json::from_str::<PendingOrder>(&payload) {
            Ok(order) => Ok(Some(order)),
            Err(e) => {
                tracing::warn!("discarding unreadable pending order: {}", e);
                Ok(None)
            }
        }
    }
}
