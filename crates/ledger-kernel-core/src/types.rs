//! Strong type definitions for the Ledger Kernel.
//!
//! All scalar quantities are newtypes to prevent mixing heights with amounts
//! (or durations with identifiers) at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! base_value {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl $name {
            /// Get the raw value.
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

base_value!(
    /// A chain height (1-indexed; 0 means "no height").
    Height(u64)
);

base_value!(
    /// An amount of some asset.
    Amount(u64)
);

base_value!(
    /// An account importance score.
    Importance(u64)
);

base_value!(
    /// Identifier of an asset (the primary asset or an artifact-backed one).
    AssetId(u64)
);

base_value!(
    /// Identifier of a created artifact definition.
    ArtifactId(u64)
);

base_value!(
    /// Number of blocks an artifact stays active.
    ArtifactDuration(u64)
);

base_value!(
    /// Block difficulty.
    Difficulty(u64)
);

base_value!(
    /// Block timestamp (milliseconds since the network epoch).
    Timestamp(u64)
);

impl Height {
    /// The next height, or `None` at `u64::MAX`.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl ArtifactDuration {
    /// Duration that never expires.
    pub const ETERNAL: Self = Self(0);

    /// `ETERNAL` and `u64::MAX` both never expire.
    pub const fn is_eternal(self) -> bool {
        self.0 == Self::ETERNAL.0 || self.0 == u64::MAX
    }
}

impl ArtifactId {
    /// Artifact ids double as asset ids for artifact-backed assets.
    pub const fn as_asset(self) -> AssetId {
        AssetId(self.0)
    }
}

impl AssetId {
    /// The artifact backing this asset.
    pub const fn as_artifact(self) -> ArtifactId {
        ArtifactId(self.0)
    }
}

/// Rounds `height` down to the start of its importance group.
///
/// A `grouping` of zero disables grouping and returns `height` unchanged.
pub fn convert_to_importance_height(height: Height, grouping: u64) -> Height {
    match height.0.checked_div(grouping) {
        Some(groups) => Height(groups * grouping),
        None => height,
    }
}

/// A 16-bit entity type tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityType(pub u16);

impl EntityType {
    /// Composite transaction embedding other transactions plus cosignatures.
    pub const AGGREGATE: Self = Self(0x4141);
    /// Balance transfer.
    pub const TRANSFER: Self = Self(0x4154);
    /// Artifact (asset type) definition.
    pub const ARTIFACT_DEFINITION: Self = Self(0x414D);
    /// Block.
    pub const BLOCK: Self = Self(0x8143);

    /// Get the raw tag.
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// Check if the tag identifies a block.
    pub const fn is_block(self) -> bool {
        self.0 & 0x8000 != 0
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({:#06x})", self.0)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_height_rounds_down() {
        assert_eq!(Height(9828), convert_to_importance_height(Height(10000), 234));
        assert_eq!(Height(234), convert_to_importance_height(Height(234), 234));
        assert_eq!(Height(0), convert_to_importance_height(Height(233), 234));
    }

    #[test]
    fn test_importance_height_zero_grouping() {
        assert_eq!(Height(77), convert_to_importance_height(Height(77), 0));
    }

    #[test]
    fn test_height_successor() {
        assert_eq!(Some(Height(8)), Height(7).checked_next());
        assert_eq!(None, Height(u64::MAX).checked_next());
    }

    #[test]
    fn test_entity_type_display() {
        assert_eq!("0x4141", EntityType::AGGREGATE.to_string());
        assert!(EntityType::BLOCK.is_block());
        assert!(!EntityType::TRANSFER.is_block());
    }
}
