//! Redis-backed group cache.
//!
//! Stores each user's group under `user_group:{user_id}` with a TTL, so an
//! entry that misses a refresh ages out instead of staying wrong.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::GroupCache;

/// Redis implementation of the GroupCache port.
#[derive(Clone)]
pub struct RedisGroupCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisGroupCache {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    /// Cache key for a user's group.
    pub fn key_for(user_id: UserId) -> String {
        format!("user_group:{}", user_id)
    }
}

/// `SET key value EX ttl`: the value and its expiry land in one command.
fn set_with_ttl(key: &str, value: &str, ttl_secs: u64) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value).arg("EX").arg(ttl_secs);
    cmd
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Group cache unavailable: {}", e))
}

#[async_trait]
impl GroupCache for RedisGroupCache {
    async fn refresh(&self, user_id: UserId, group: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        set_with_ttl(&Self::key_for(user_id), group, self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_by_user() {
        assert_eq!(RedisGroupCache::key_for(UserId::new(42).unwrap()), "user_group:42");
    }

    #[test]
    fn group_and_ttl_are_written_by_one_command() {
        let packed = set_with_ttl("user_group:42", "pro", 3600).get_packed_command();
        let expected = b"*5\r\n$3\r\nSET\r\n$13\r\nuser_group:42\r\n$3\r\npro\r\n$2\r\nEX\r\n$4\r\n3600\r\n";
        assert_eq!(packed, expected.to_vec());
    }
}
