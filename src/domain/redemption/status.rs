//! Redemption status state machine.
//!
//! A code starts `Enabled`, is consumed exactly once into `Used`, and may be
//! switched between `Enabled` and `Disabled` by an administrator until then.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a redemption code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    /// Issued and redeemable.
    Enabled,

    /// Consumed by a successful redemption. Terminal.
    Used,

    /// Switched off by an administrator.
    Disabled,
}

impl RedemptionStatus {
    /// Integer representation used by the `status` column.
    pub fn as_i16(&self) -> i16 {
        match self {
            RedemptionStatus::Enabled => 1,
            RedemptionStatus::Used => 2,
            RedemptionStatus::Disabled => 3,
        }
    }

    /// Parses the integer stored in the `status` column.
    pub fn from_i16(value: i16) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(RedemptionStatus::Enabled),
            2 => Ok(RedemptionStatus::Used),
            3 => Ok(RedemptionStatus::Disabled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown redemption status {}", other),
            )),
        }
    }

    /// Returns true if a code in this status may still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        matches!(self, RedemptionStatus::Enabled)
    }
}

impl StateMachine for RedemptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RedemptionStatus::*;
        matches!(
            (self, target),
            (Enabled, Used) | (Enabled, Disabled) | (Disabled, Enabled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RedemptionStatus::*;
        match self {
            Enabled => vec![Used, Disabled],
            Used => vec![],
            Disabled => vec![Enabled],
        }
    }
}
