use crate::tracking::event::PurchaseEvent;
use std::sync::{Arc, Mutex};

#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &PurchaseEvent) -> anyhow::Result<()>;
}

/// Test double; keeps every recorded event in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<PurchaseEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<PurchaseEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for MemorySink {
    async fn record(&self, event: &PurchaseEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("sink poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

/// Production sink: appends purchase events to a capped Redis stream that the
/// analytics consumers read from.
pub struct RedisStreamSink {
    pub client: redis::Client,
    pub stream_key: String,
}

#[async_trait::async_trait]
impl AnalyticsSink for RedisStreamSink {
    async fn record(&self, event: &PurchaseEvent) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(event)?;
        let _: String = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(1_000_000)
            .arg("*")
            .arg("event")
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
