//! In-memory group cache.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::GroupCache;

/// Group cache backed by a map, with an optional failure switch for tests.
///
/// # Panics
///
/// `group_of` panics if the internal lock is poisoned.
#[derive(Debug, Default)]
pub struct InMemoryGroupCache {
    groups: RwLock<HashMap<UserId, String>>,
    unavailable: bool,
}

impl InMemoryGroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose every call fails with `CacheError`.
    pub fn unavailable() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Cached group of a user.
    pub fn group_of(&self, user_id: UserId) -> Option<String> {
        self.groups
            .read()
            .expect("InMemoryGroupCache: lock poisoned")
            .get(&user_id)
            .cloned()
    }
}

#[async_trait]
impl GroupCache for InMemoryGroupCache {
    async fn refresh(&self, user_id: UserId, group: &str) -> Result<(), DomainError> {
        if self.unavailable {
            return Err(DomainError::new(ErrorCode::CacheError, "Group cache unavailable"));
        }
        self.groups
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Group cache lock poisoned"))?
            .insert(user_id, group.to_string());
        Ok(())
    }
}
