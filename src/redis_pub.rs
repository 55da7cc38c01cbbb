use std::sync::Arc;

use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::Mutex;

/// Best-effort event announcements on Redis pub/sub channels. Mutations go
/// through whether or not the publish succeeds; failures are the caller's to
/// log, never to propagate.
#[derive(Clone)]
pub struct RedisPublisher {
    conn: Option<Arc<Mutex<redis::aio::MultiplexedConnection>>>,
}

impl RedisPublisher {
    pub async fn new(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn: Some(Arc::new(Mutex::new(conn))),
        })
    }

    /// Publisher that drops every event, for deployments without Redis.
    pub fn new_noop() -> Self {
        Self { conn: None }
    }

    pub async fn publish<T: serde::Serialize>(
        &self,
        channel: &str,
        event: &T,
    ) -> Result<(), RedisError> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };
        let payload = serde_json::to_string(event)
            .map_err(|e| RedisError::from((redis::ErrorKind::TypeError, "serialize", e.to_string())))?;
        let mut lock = conn.lock().await;
        lock.publish::<_, _, ()>(channel, payload).await
    }
}
