//! State changes applied for accepted notifications.

use ledger_kernel_cache::{AccountState, CacheDelta, CacheError, DifficultyInfo};
use ledger_kernel_core::{
    Amount, ArtifactDefinition, BalanceTransferNotification, Height, Notification, PublicKey,
};

/// Applies notifications to a cache delta at a given height.
#[derive(Debug, Clone, Copy)]
pub struct StateObserver {
    difficulty_history_size: u64,
}

impl StateObserver {
    pub fn new(difficulty_history_size: u64) -> Self {
        Self {
            difficulty_history_size,
        }
    }

    pub fn notify(
        &self,
        notification: &Notification<'_>,
        height: Height,
        delta: &mut CacheDelta,
    ) -> Result<(), CacheError> {
        match notification {
            Notification::AccountPublicKey(account) => {
                ensure_account(delta, account.public_key, height);
            }
            Notification::BalanceTransfer(transfer) => {
                apply_transfer(delta, transfer, height)?;
            }
            Notification::ArtifactDefinition(definition) => {
                delta.artifacts_mut().insert(
                    definition.artifact_id,
                    ArtifactDefinition::new(height, definition.owner, definition.properties),
                );
                ensure_account(delta, definition.owner, height);
                let asset_id = definition.artifact_id.as_asset();
                let supply = definition.supply;
                delta
                    .accounts_mut()
                    .update(&definition.owner, |account| account.balances.credit(asset_id, supply))
                    .transpose()?;
            }
            Notification::Block(block) => {
                let difficulties = delta.difficulties_mut();
                difficulties.insert(
                    block.height,
                    DifficultyInfo {
                        height: block.height,
                        timestamp: block.timestamp,
                        difficulty: block.difficulty,
                    },
                );
                if let Some(pruned) = block.height.0.checked_sub(self.difficulty_history_size) {
                    difficulties.remove(&Height(pruned));
                }
            }
            Notification::Signature(_)
            | Notification::AggregateCosignatures(_)
            | Notification::AggregateEmbeddedTransaction(_) => {}
        }
        Ok(())
    }
}

fn ensure_account(delta: &mut CacheDelta, public_key: PublicKey, height: Height) {
    if delta.accounts().get(&public_key).is_none() {
        delta
            .accounts_mut()
            .insert(public_key, AccountState::new(public_key, height));
    }
}

fn apply_transfer(
    delta: &mut CacheDelta,
    transfer: &BalanceTransferNotification,
    height: Height,
) -> Result<(), CacheError> {
    if transfer.amount == Amount(0) {
        return Ok(());
    }

    let debited = delta
        .accounts_mut()
        .update(&transfer.sender, |account| {
            account.balances.debit(transfer.asset_id, transfer.amount)
        });
    match debited {
        Some(result) => result?,
        None => {
            return Err(CacheError::InsufficientBalance {
                asset_id: transfer.asset_id,
                available: Amount(0),
                requested: transfer.amount,
            })
        }
    }

    ensure_account(delta, transfer.recipient, height);
    delta
        .accounts_mut()
        .update(&transfer.recipient, |account| {
            account.balances.credit(transfer.asset_id, transfer.amount)
        })
        .transpose()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel_cache::LedgerCache;
    use ledger_kernel_core::{
        AccountPublicKeyNotification, ArtifactDefinitionNotification, ArtifactFlags, ArtifactId,
        ArtifactProperties, AssetId, BlockNotification, Difficulty, Timestamp,
        ArtifactDuration,
    };

    fn key(byte: u8) -> PublicKey {
        PublicKey([byte; 32])
    }

    fn funded(cache: &LedgerCache, owner: PublicKey, balance: u64) {
        let mut delta = cache.create_delta();
        let mut account = AccountState::new(owner, Height(1));
        account.balances.credit(AssetId(0), Amount(balance)).unwrap();
        delta.accounts_mut().insert(owner, account);
        cache.commit(delta, Height(1)).unwrap();
    }

    #[test]
    fn test_account_created_once() {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        let observer = StateObserver::new(3);
        let notification = Notification::AccountPublicKey(AccountPublicKeyNotification {
            public_key: key(1),
        });

        observer.notify(&notification, Height(5), &mut delta).unwrap();
        observer.notify(&notification, Height(6), &mut delta).unwrap();

        assert_eq!(Some(Height(5)), delta.accounts().get(&key(1)).map(|a| a.height));
    }

    #[test]
    fn test_transfer_moves_balance() {
        let cache = LedgerCache::new();
        funded(&cache, key(1), 100);
        let mut delta = cache.create_delta();
        let observer = StateObserver::new(3);

        let transfer = Notification::BalanceTransfer(BalanceTransferNotification {
            sender: key(1),
            recipient: key(2),
            asset_id: AssetId(0),
            amount: Amount(30),
        });
        observer.notify(&transfer, Height(2), &mut delta).unwrap();

        let balance = |k| delta.accounts().get(&k).map(|a| a.balances.get(AssetId(0)));
        assert_eq!(Some(Amount(70)), balance(key(1)));
        assert_eq!(Some(Amount(30)), balance(key(2)));
    }

    #[test]
    fn test_transfer_from_unknown_sender_fails() {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        let transfer = Notification::BalanceTransfer(BalanceTransferNotification {
            sender: key(1),
            recipient: key(2),
            asset_id: AssetId(0),
            amount: Amount(1),
        });

        assert!(matches!(
            StateObserver::new(3).notify(&transfer, Height(2), &mut delta),
            Err(CacheError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_artifact_definition_credits_supply() {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        let notification = Notification::ArtifactDefinition(ArtifactDefinitionNotification {
            owner: key(4),
            artifact_id: ArtifactId(77),
            properties: ArtifactProperties::new(
                ArtifactFlags::TRANSFERABLE,
                2,
                ArtifactDuration(10),
            ),
            supply: Amount(500),
        });
        StateObserver::new(3)
            .notify(&notification, Height(9), &mut delta)
            .unwrap();

        let definition = delta.artifacts().get(&ArtifactId(77)).copied().unwrap();
        assert_eq!(Height(9), definition.height);
        assert_eq!(key(4), definition.owner);
        assert_eq!(
            Amount(500),
            delta.accounts().get(&key(4)).unwrap().balances.get(AssetId(77))
        );
    }

    #[test]
    fn test_block_samples_are_windowed() {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        let observer = StateObserver::new(3);

        for height in 1..=5 {
            let block = Notification::Block(BlockNotification {
                signer: key(1),
                height: Height(height),
                timestamp: Timestamp(height * 10),
                difficulty: Difficulty(height),
            });
            observer.notify(&block, Height(height), &mut delta).unwrap();
        }

        let difficulties = delta.difficulties();
        assert!(difficulties.get(&Height(2)).is_none());
        for height in 3..=5 {
            assert!(difficulties.get(&Height(height)).is_some());
        }
    }
}
