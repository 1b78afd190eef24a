//! Chain configuration shared by plugins, validators and the cache.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{Amount, ArtifactDuration, AssetId};

/// Network-wide parameters, assembled once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfiguration {
    /// Interval importance heights are rounded down to.
    pub importance_grouping: u64,
    /// Minimum primary-asset balance required to harvest a block.
    pub min_harvester_balance: Amount,
    /// The network's primary asset.
    pub primary_asset_id: AssetId,
    /// Maximum embedded transactions in one aggregate.
    pub max_transactions_per_aggregate: u32,
    /// Maximum cosignatures on one aggregate.
    pub max_cosignatures_per_aggregate: u32,
    /// Longest finite artifact duration.
    pub max_artifact_duration: ArtifactDuration,
    /// Number of difficulty samples retained.
    pub difficulty_history_size: u64,
}

impl Default for ChainConfiguration {
    fn default() -> Self {
        Self {
            importance_grouping: 359,
            min_harvester_balance: Amount(10_000),
            primary_asset_id: AssetId(0),
            max_transactions_per_aggregate: 100,
            max_cosignatures_per_aggregate: 25,
            max_artifact_duration: ArtifactDuration(365 * 2880),
            difficulty_history_size: 60,
        }
    }
}

impl ChainConfiguration {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.importance_grouping == 0 {
            return Err(CoreError::InvalidConfig(
                "importance_grouping must be non-zero".into(),
            ));
        }
        if self.difficulty_history_size == 0 {
            return Err(CoreError::InvalidConfig(
                "difficulty_history_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        ChainConfiguration::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ChainConfiguration::from_json_str(r#"{"importance_grouping": 234, "min_harvester_balance": 1234}"#)
                .unwrap();
        assert_eq!(234, config.importance_grouping);
        assert_eq!(Amount(1234), config.min_harvester_balance);
        assert_eq!(60, config.difficulty_history_size);
    }

    #[test]
    fn test_zero_grouping_rejected() {
        let err = ChainConfiguration::from_json_str(r#"{"importance_grouping": 0}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ChainConfiguration::from_json_str(r#"{"grouping": 5}"#).unwrap_err();
        assert!(matches!(err, CoreError::ConfigDecoding(_)));
    }
}
