//! Artifact definitions and their height-relative lifecycle.

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;
use crate::types::{ArtifactDuration, Height};

/// Bit flags of an artifact definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactFlags(pub u8);

impl ArtifactFlags {
    pub const NONE: Self = Self(0);
    pub const SUPPLY_MUTABLE: Self = Self(0x01);
    pub const TRANSFERABLE: Self = Self(0x02);
    pub const ALL: Self = Self(0x03);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check that no unknown bits are set.
    pub const fn is_known(self) -> bool {
        self.0 & !Self::ALL.0 == 0
    }
}

/// Properties of an artifact definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactProperties {
    pub flags: ArtifactFlags,
    pub divisibility: u8,
    pub duration: ArtifactDuration,
}

impl ArtifactProperties {
    pub fn new(flags: ArtifactFlags, divisibility: u8, duration: ArtifactDuration) -> Self {
        Self {
            flags,
            divisibility,
            duration,
        }
    }
}

/// A created artifact: owner, creation height and properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDefinition {
    pub height: Height,
    pub owner: PublicKey,
    pub properties: ArtifactProperties,
}

impl ArtifactDefinition {
    pub fn new(height: Height, owner: PublicKey, properties: ArtifactProperties) -> Self {
        Self {
            height,
            owner,
            properties,
        }
    }

    /// Duration `0` and `u64::MAX` both mean the artifact never expires.
    pub fn is_eternal(&self) -> bool {
        self.properties.duration.is_eternal()
    }

    /// First height at which a finite artifact is expired.
    ///
    /// `None` for eternal artifacts and for windows extending past `u64::MAX`.
    pub fn expiry_height(&self) -> Option<Height> {
        if self.is_eternal() {
            return None;
        }
        self.height
            .0
            .checked_add(self.properties.duration.0)
            .map(Height)
    }

    /// Active below the expiry height. There is no lower bound: heights before
    /// creation are reported active too.
    pub fn is_active(&self, height: Height) -> bool {
        match self.expiry_height() {
            Some(expiry) => height < expiry,
            None => true,
        }
    }

    pub fn is_expired(&self, height: Height) -> bool {
        match self.expiry_height() {
            Some(expiry) => height >= expiry,
            None => false,
        }
    }
}
