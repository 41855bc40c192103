//! Redis-backed transient cache
//!
//! Uses blocking connections: mapper calls are synchronous end to end.

use crate::errors::CacheError;
use crate::manager::TransientCache;
use redis::{Client, Commands};
use std::fmt::Debug;

pub struct RedisCache {
    client: Client,
}

impl Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Open a client for the given URL; no connection is made until first use
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, CacheError> {
        Ok(self.client.get_connection()?)
    }
}

impl TransientCache for RedisCache {
    fn fetch(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection()?;
        let cached: Option<String> = conn.get(key)?;
        Ok(cached)
    }

    fn update(&self, key: &str, value: &str, ttl: u64) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        if ttl > 0 {
            let _: () = conn.set_ex(key, value, ttl)?;
        } else {
            let _: () = conn.set(key, value)?;
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection()?;
        let deleted: i32 = conn.del(key)?;
        Ok(deleted > 0)
    }
}
