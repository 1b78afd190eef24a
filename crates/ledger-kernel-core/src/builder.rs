//! Builders producing signed binary entities.

use bytes::{BufMut, Bytes, BytesMut};

use crate::crypto::{Hash256, Keypair, PublicKey, Signature, SIGNATURE_SIZE};
use crate::entity::{
    offsets, Block, Cosignature, Transaction, AGGREGATE_HEADER_SIZE, BLOCK_HEADER_SIZE,
    COSIGNATURE_SIZE, EMBEDDED_HEADER_SIZE, TRANSACTION_HEADER_SIZE, VERIFIABLE_HEADER_SIZE,
};
use crate::types::{Amount, Difficulty, EntityType, Height, Timestamp};

/// Current entity version.
pub const ENTITY_VERSION: u16 = 1;

fn write_signature(buf: &mut [u8], signature: &Signature) {
    buf[offsets::SIGNATURE..offsets::SIGNATURE + SIGNATURE_SIZE].copy_from_slice(signature.as_bytes());
}

/// Builder for a transaction embedded in an aggregate.
#[derive(Debug, Clone)]
pub struct EmbeddedTransactionBuilder {
    signer: PublicKey,
    entity_type: EntityType,
    version: u16,
    body: Bytes,
}

impl EmbeddedTransactionBuilder {
    pub fn new(signer: PublicKey, entity_type: EntityType) -> Self {
        Self {
            signer,
            entity_type,
            version: ENTITY_VERSION,
            body: Bytes::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Encode the embedded transaction.
    pub fn build(self) -> Bytes {
        let size = EMBEDDED_HEADER_SIZE + self.body.len();
        let mut buf = BytesMut::with_capacity(size);
        buf.put_u32_le(size as u32);
        buf.put_slice(self.signer.as_bytes());
        buf.put_u16_le(self.version);
        buf.put_u16_le(self.entity_type.to_u16());
        buf.put_slice(&self.body);
        buf.freeze()
    }
}

/// Builder for a plain (non-aggregate) top-level transaction.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    entity_type: EntityType,
    version: u16,
    fee: Amount,
    deadline: Timestamp,
    body: Bytes,
}

impl TransactionBuilder {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            version: ENTITY_VERSION,
            fee: Amount(0),
            deadline: Timestamp(0),
            body: Bytes::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    pub fn deadline(mut self, deadline: Timestamp) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Encode with a zero signature.
    pub fn build_unsigned(self, signer: PublicKey) -> BytesMut {
        let size = TRANSACTION_HEADER_SIZE + self.body.len();
        let mut buf = BytesMut::with_capacity(size);
        put_transaction_header(
            &mut buf,
            size,
            signer,
            self.version,
            self.entity_type,
            self.fee,
            self.deadline,
        );
        buf.put_slice(&self.body);
        buf
    }

    /// Build and sign everything past the verifiable header.
    pub fn sign(self, keypair: &Keypair) -> Transaction {
        let mut buf = self.build_unsigned(keypair.public_key());
        let signature = keypair.sign(&buf[VERIFIABLE_HEADER_SIZE..]);
        write_signature(&mut buf, &signature);
        Transaction::from_trusted(buf.freeze())
    }
}

fn put_transaction_header(
    buf: &mut BytesMut,
    size: usize,
    signer: PublicKey,
    version: u16,
    entity_type: EntityType,
    fee: Amount,
    deadline: Timestamp,
) {
    buf.put_u32_le(size as u32);
    buf.put_slice(Signature::ZERO.as_bytes());
    buf.put_slice(signer.as_bytes());
    buf.put_u16_le(version);
    buf.put_u16_le(entity_type.to_u16());
    buf.put_u64_le(fee.get());
    buf.put_u64_le(deadline.get());
}

/// Builder for an aggregate transaction.
///
/// Cosigners sign the same data buffer as the aggregate signer.
#[derive(Debug, Clone, Default)]
pub struct AggregateBuilder {
    fee: Amount,
    deadline: Timestamp,
    transactions: Vec<Bytes>,
    cosignatures: Vec<Cosignature>,
}

impl AggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    pub fn deadline(mut self, deadline: Timestamp) -> Self {
        self.deadline = deadline;
        self
    }

    /// Append an encoded embedded transaction.
    pub fn transaction(mut self, embedded: impl Into<Bytes>) -> Self {
        self.transactions.push(embedded.into());
        self
    }

    /// Append a precomputed cosignature, signed or not.
    pub fn cosignature(mut self, cosignature: Cosignature) -> Self {
        self.cosignatures.push(cosignature);
        self
    }

    fn encode(&self, signer: PublicKey, cosigner_count: usize) -> BytesMut {
        let payload_size: usize = self.transactions.iter().map(Bytes::len).sum();
        let cosignature_count = self.cosignatures.len() + cosigner_count;
        let size = AGGREGATE_HEADER_SIZE + payload_size + cosignature_count * COSIGNATURE_SIZE;

        let mut buf = BytesMut::with_capacity(size);
        put_transaction_header(
            &mut buf,
            size,
            signer,
            ENTITY_VERSION,
            EntityType::AGGREGATE,
            self.fee,
            self.deadline,
        );
        buf.put_u32_le(payload_size as u32);
        for transaction in &self.transactions {
            buf.put_slice(transaction);
        }
        buf
    }

    /// Build, sign with `keypair`, then append a cosignature from each of `cosigners`
    /// followed by any precomputed cosignatures.
    pub fn sign(self, keypair: &Keypair, cosigners: &[&Keypair]) -> Transaction {
        let mut buf = self.encode(keypair.public_key(), cosigners.len());
        let data_end = buf.len();

        let signature = keypair.sign(&buf[VERIFIABLE_HEADER_SIZE..data_end]);
        write_signature(&mut buf, &signature);

        for cosigner in cosigners {
            let signature = cosigner.sign(&buf[VERIFIABLE_HEADER_SIZE..data_end]);
            buf.put_slice(cosigner.public_key().as_bytes());
            buf.put_slice(signature.as_bytes());
        }
        for cosignature in &self.cosignatures {
            buf.put_slice(cosignature.signer.as_bytes());
            buf.put_slice(cosignature.signature.as_bytes());
        }

        Transaction::from_trusted(buf.freeze())
    }
}

/// Builder for a block.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    height: Height,
    timestamp: Timestamp,
    difficulty: Difficulty,
    previous_block_hash: Hash256,
    transactions: Vec<Transaction>,
}

impl BlockBuilder {
    pub fn new(height: Height) -> Self {
        Self {
            height,
            timestamp: Timestamp(0),
            difficulty: Difficulty(0),
            previous_block_hash: Hash256::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn previous_block_hash(mut self, hash: Hash256) -> Self {
        self.previous_block_hash = hash;
        self
    }

    pub fn transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// Build and sign the block header.
    pub fn sign(self, keypair: &Keypair) -> Block {
        let transactions_size: usize = self.transactions.iter().map(|tx| tx.as_bytes().len()).sum();
        let size = BLOCK_HEADER_SIZE + transactions_size;

        let mut buf = BytesMut::with_capacity(size);
        buf.put_u32_le(size as u32);
        buf.put_slice(Signature::ZERO.as_bytes());
        buf.put_slice(keypair.public_key().as_bytes());
        buf.put_u16_le(ENTITY_VERSION);
        buf.put_u16_le(EntityType::BLOCK.to_u16());
        buf.put_u64_le(self.height.get());
        buf.put_u64_le(self.timestamp.get());
        buf.put_u64_le(self.difficulty.get());
        buf.put_slice(self.previous_block_hash.as_bytes());

        let signature = keypair.sign(&buf[VERIFIABLE_HEADER_SIZE..BLOCK_HEADER_SIZE]);
        write_signature(&mut buf, &signature);

        for transaction in &self.transactions {
            buf.put_slice(transaction.as_bytes());
        }

        Block::from_trusted(buf.freeze())
    }
}
