/// Asset status definitions for tracking pipeline progress
///
/// A record is created either `Downloaded` or `Failed`. The only forward
/// transition is `Downloaded -> Optimized`; nothing ever regresses.
use crate::SiteliftError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of an asset in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// Bytes are on disk in their original form
    Downloaded,

    /// Re-encoded master (and any variants) written
    Optimized,

    /// Download failed; nothing on disk
    Failed,
}

impl AssetStatus {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Optimized | Self::Failed)
    }

    /// Returns true if the asset's bytes are available locally
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Downloaded | Self::Optimized)
    }

    /// Checks the transition table
    ///
    /// | From | To | Allowed |
    /// |------|----|---------|
    /// | any | same | yes (no-op) |
    /// | Downloaded | Optimized | yes |
    /// | anything else | | no |
    pub fn can_transition_to(&self, to: AssetStatus) -> bool {
        *self == to || matches!((self, to), (Self::Downloaded, Self::Optimized))
    }

    /// Applies a transition, rejecting anything outside the table
    pub fn transition(self, to: AssetStatus) -> Result<AssetStatus, SiteliftError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(SiteliftError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloaded => "downloaded",
            Self::Optimized => "optimized",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transition() {
        assert_eq!(
            AssetStatus::Downloaded
                .transition(AssetStatus::Optimized)
                .unwrap(),
            AssetStatus::Optimized
        );
    }

    #[test]
    fn test_no_regression() {
        assert!(AssetStatus::Optimized
            .transition(AssetStatus::Downloaded)
            .is_err());
        assert!(AssetStatus::Failed.transition(AssetStatus::Optimized).is_err());
        assert!(AssetStatus::Optimized.transition(AssetStatus::Failed).is_err());
    }

    #[test]
    fn test_same_state_is_noop() {
        for status in [
            AssetStatus::Downloaded,
            AssetStatus::Optimized,
            AssetStatus::Failed,
        ] {
            assert_eq!(status.transition(status).unwrap(), status);
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(!AssetStatus::Downloaded.is_terminal());
        assert!(AssetStatus::Optimized.is_terminal());
        assert!(AssetStatus::Failed.is_terminal());
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(
            serde_json::to_string(&AssetStatus::Optimized).unwrap(),
            "\"optimized\""
        );
        assert_eq!(AssetStatus::Failed.to_string(), "failed");
    }
}
