//! Redemption reader port (read side / admin listing).

use crate::domain::foundation::DomainError;
use crate::domain::redemption::{Redemption, SearchKeyword};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Creates a request, clamping `limit` to `1..=MAX_PAGE_SIZE`.
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Reader port for listing and searching codes.
///
/// Results are ordered by id descending (newest first) and never include
/// soft-deleted records.
#[async_trait]
pub trait RedemptionReader: Send + Sync {
    /// Lists live codes.
    async fn list(&self, page: PageRequest) -> Result<Page<Redemption>, DomainError>;

    /// Searches live codes by id or name prefix.
    async fn search(
        &self,
        keyword: &SearchKeyword,
        page: PageRequest,
    ) -> Result<Page<Redemption>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn RedemptionReader) {}
    }

    #[test]
    fn page_request_clamps_limit() {
        assert_eq!(PageRequest::new(0, 0).limit, 1);
        assert_eq!(PageRequest::new(0, 500).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(40, 20), PageRequest { offset: 40, limit: 20 });
    }
}
