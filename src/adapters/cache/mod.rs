//! Cache adapters.

mod redis_group_cache;

pub use redis_group_cache::RedisGroupCache;
