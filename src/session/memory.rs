use crate::session::{PendingSession, SessionStore};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<PendingSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, record: &PendingSession) -> anyhow::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow::anyhow!("session slot poisoned"))?;
        *slot = Some(record.clone());
        Ok(())
    }

    async fn consume(&self) -> anyhow::Result<Option<PendingSession>> {
        let mut slot = self.slot.lock().map_err(|_| anyhow::anyhow!("session slot poisoned"))?;
        Ok(slot.take())
    }
}
