use crate::error::ServiceError;
use crate::gateway::{EpsConfig, EpsGateway};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct EpsConfigCache {
    gateway: Arc<dyn EpsGateway>,
    inner: Arc<RwLock<Option<(std::time::Instant, EpsConfig)>>>,
    ttl: std::time::Duration,
}

impl EpsConfigCache {
    pub fn new(gateway: Arc<dyn EpsGateway>, ttl: std::time::Duration) -> Self {
        Self {
            gateway,
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    pub async fn current(&self) -> Result<EpsConfig, ServiceError> {
        {
            let read = self.inner.read().await;
            if let Some((loaded_at, config)) = &*read {
                if loaded_at.elapsed() <= self.ttl {
                    return Ok(*config);
                }
            }
        }

        let config = self.gateway.fetch_config().await?;
        let mut write = self.inner.write().await;
        *write = Some((std::time::Instant::now(), config));
        Ok(config)
    }
}
