//! Redemption key value object.
//!
//! The key is the secret a user presents to redeem a code. It is stored in a
//! `VARCHAR(32)` column, so anything longer can never match.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum key length accepted by the store.
pub const MAX_KEY_LEN: usize = 32;

/// A validated redemption key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionKey(String);

impl RedemptionKey {
    /// Creates a key from user input, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let key = raw.as_ref().trim();
        if key.is_empty() {
            return Err(ValidationError::empty_field("key"));
        }
        let len = key.chars().count();
        if len > MAX_KEY_LEN {
            return Err(ValidationError::out_of_range(
                "key",
                1,
                MAX_KEY_LEN as i64,
                len as i64,
            ));
        }
        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a form that is safe to write to logs.
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{}****", visible)
    }
}

// Keys are bearer secrets; never print them in full.
impl fmt::Debug for RedemptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RedemptionKey").field(&self.masked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims_key() {
        let key = RedemptionKey::new("  abcdef0123456789  ").unwrap();
        assert_eq!(key.as_str(), "abcdef0123456789");
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(
            RedemptionKey::new("   "),
            Err(ValidationError::empty_field("key"))
        );
    }

    #[test]
    fn rejects_overlong_key() {
        let raw = "a".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(
            RedemptionKey::new(raw),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn accepts_full_width_key() {
        let raw = "b".repeat(MAX_KEY_LEN);
        assert!(RedemptionKey::new(raw).is_ok());
    }

    #[test]
    fn debug_output_is_masked() {
        let key = RedemptionKey::new("quota-redemption-key-00000001").unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("quot****"));
        assert!(!debug.contains("00000001"));
    }
}
