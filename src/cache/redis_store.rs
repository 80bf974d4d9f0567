use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use super::store::{CacheError, CacheStore};

/// Redis backend sharing one multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::unavailable)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<String>>(key)
            .await
            .map_err(CacheError::unavailable)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let seconds = ttl.as_secs().max(1);
        connection
            .set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(CacheError::unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        connection
            .del::<_, ()>(key)
            .await
            .map_err(CacheError::unavailable)
    }
}
