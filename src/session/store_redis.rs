use crate::session::{PendingSession, SessionStore};

pub struct RedisSessionStore {
    pub client: redis::Client,
    pub key: String,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, key_prefix: &str) -> Self {
        Self {
            client,
            key: format!("{}:pending_session", key_prefix),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, record: &PendingSession) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(record)?;
        let _: () = redis::cmd("SET")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn consume(&self) -> anyhow::Result<Option<PendingSession>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = redis::cmd("GETDEL")
            .arg(&self.key)
            .query_async(&mut conn)
            .await?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        match serde_json::from_str::<PendingSession>(&payload) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("discarding unreadable pending session: {}", e);
                Ok(None)
            }
        }
    }
}
