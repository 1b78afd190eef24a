//! Values stored in the ledger sub-caches.

use std::collections::BTreeMap;

use ledger_kernel_core::{Amount, AssetId, Difficulty, Height, Importance, PublicKey, Timestamp};

use crate::error::{CacheError, Result};

/// Per-asset balances of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    amounts: BTreeMap<AssetId, Amount>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `asset_id` (zero when never credited).
    pub fn get(&self, asset_id: AssetId) -> Amount {
        self.amounts.get(&asset_id).copied().unwrap_or_default()
    }

    pub fn credit(&mut self, asset_id: AssetId, amount: Amount) -> Result<()> {
        if amount.0 == 0 {
            return Ok(());
        }
        let current = self.get(asset_id);
        let updated = current
            .0
            .checked_add(amount.0)
            .ok_or(CacheError::BalanceOverflow(asset_id))?;
        self.amounts.insert(asset_id, Amount(updated));
        Ok(())
    }

    pub fn debit(&mut self, asset_id: AssetId, amount: Amount) -> Result<()> {
        if amount.0 == 0 {
            return Ok(());
        }
        let current = self.get(asset_id);
        let updated = current
            .0
            .checked_sub(amount.0)
            .ok_or(CacheError::InsufficientBalance {
                asset_id,
                available: current,
                requested: amount,
            })?;
        if updated == 0 {
            self.amounts.remove(&asset_id);
        } else {
            self.amounts.insert(asset_id, Amount(updated));
        }
        Ok(())
    }

    /// Non-zero balances in asset order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetId, Amount)> + '_ {
        self.amounts.iter().map(|(asset, amount)| (*asset, *amount))
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// An importance score and the height at which it took effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportanceInfo {
    pub importance: Importance,
    pub height: Height,
}

impl ImportanceInfo {
    pub fn new(importance: Importance, height: Height) -> Self {
        Self { importance, height }
    }
}

/// State of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub public_key: PublicKey,
    /// Height at which the account was first seen.
    pub height: Height,
    pub importance: ImportanceInfo,
    pub balances: Balances,
}

impl AccountState {
    pub fn new(public_key: PublicKey, height: Height) -> Self {
        Self {
            public_key,
            height,
            importance: ImportanceInfo::default(),
            balances: Balances::new(),
        }
    }
}

/// A per-height difficulty sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyInfo {
    pub height: Height,
    pub timestamp: Timestamp,
    pub difficulty: Difficulty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut balances = Balances::new();
        balances.credit(AssetId(0), Amount(100)).unwrap();
        balances.debit(AssetId(0), Amount(40)).unwrap();
        assert_eq!(Amount(60), balances.get(AssetId(0)));
        assert_eq!(Amount(0), balances.get(AssetId(7)));
    }

    #[test]
    fn test_debit_underflow() {
        let mut balances = Balances::new();
        balances.credit(AssetId(1), Amount(5)).unwrap();
        let err = balances.debit(AssetId(1), Amount(6)).unwrap_err();
        assert!(matches!(
            err,
            CacheError::InsufficientBalance {
                available: Amount(5),
                requested: Amount(6),
                ..
            }
        ));
        assert_eq!(Amount(5), balances.get(AssetId(1)));
    }

    #[test]
    fn test_zero_balances_are_dropped() {
        let mut balances = Balances::new();
        balances.credit(AssetId(1), Amount(5)).unwrap();
        balances.debit(AssetId(1), Amount(5)).unwrap();
        assert!(balances.is_empty());
    }

    #[test]
    fn test_credit_overflow() {
        let mut balances = Balances::new();
        balances.credit(AssetId(0), Amount(u64::MAX)).unwrap();
        assert!(matches!(
            balances.credit(AssetId(0), Amount(1)),
            Err(CacheError::BalanceOverflow(AssetId(0)))
        ));
    }
}
