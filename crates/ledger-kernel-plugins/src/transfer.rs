//! Balance transfer transactions.

use bytes::{BufMut, BytesMut};
use ledger_kernel_core::{
    Amount, AssetId, BalanceTransferNotification, EntityError, EntityReader, EntityType,
    Notification, NotificationSink, PublicKey,
};

use crate::body::{FixedBody, FixedBodyPlugin};

/// Plugin for [`EntityType::TRANSFER`].
pub type TransferPlugin = FixedBodyPlugin<TransferBody>;

/// Body of a transfer: `amount` of `asset_id` sent to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferBody {
    pub recipient: PublicKey,
    pub asset_id: AssetId,
    pub amount: Amount,
}

impl FixedBody for TransferBody {
    const ENTITY_TYPE: EntityType = EntityType::TRANSFER;
    const SIZE: usize = 32 + 8 + 8;

    fn read(reader: &mut EntityReader<'_>) -> Result<Self, EntityError> {
        Ok(Self {
            recipient: PublicKey(reader.read_array()?),
            asset_id: AssetId(reader.read_u64()?),
            amount: Amount(reader.read_u64()?),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(self.recipient.as_bytes());
        buf.put_u64_le(self.asset_id.get());
        buf.put_u64_le(self.amount.get());
    }

    fn publish_body<'a>(&self, signer: PublicKey, sink: &mut dyn NotificationSink<'a>) {
        sink.notify(Notification::account(self.recipient));
        sink.notify(Notification::BalanceTransfer(BalanceTransferNotification {
            sender: signer,
            recipient: self.recipient,
            asset_id: self.asset_id,
            amount: self.amount,
        }));
    }
}
