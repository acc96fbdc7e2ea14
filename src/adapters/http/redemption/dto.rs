//! HTTP DTOs (Data Transfer Objects) for redemption endpoints.

use serde::{Deserialize, Serialize};

use crate::application::RedeemResult;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to redeem a code.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    /// The secret redemption key.
    pub key: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Successful redemption.
///
/// Wallet redemptions report `plan_id: 0` and an empty `plan_title`; plan
/// redemptions report `quota: 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub quota: i64,
    pub plan_id: i64,
    pub plan_title: String,
}

impl From<RedeemResult> for RedeemResponse {
    fn from(result: RedeemResult) -> Self {
        Self {
            quota: result.quota,
            plan_id: result.plan_id.map(|id| id.as_i64()).unwrap_or(0),
            plan_title: result.plan_title,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}
