/// Thin handle around the Redis client. Constructed once at startup when
/// `REDIS_URL` is set and handed to handlers through `AppState`; opening the
/// client does not touch the network, so a dead Redis only surfaces on use.
#[derive(Clone)]
pub struct CacheClient {
    client: redis::Client,
}

impl CacheClient {
    pub fn open(url: &str) -> Result<Self, redis::RedisError> {
        Ok(CacheClient {
            client: redis::Client::open(url)?,
        })
    }

    /// One PING round-trip, used by the health probe.
    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
