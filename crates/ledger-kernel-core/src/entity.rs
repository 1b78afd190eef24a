//! Binary entity layout.
//!
//! Entities are self-describing little-endian records. Every access goes
//! through an [`EntityReader`] or through a view whose bounds were checked once
//! at parse time; views borrow from the owning buffer instead of copying.
//!
//! ```text
//! verifiable header  | size u32 | signature [64] | signer [32] |
//! transaction        | header | version u16 | type u16 | fee u64 | deadline u64 | body.. |
//! embedded           | size u32 | signer [32] | version u16 | type u16 | body.. |
//! aggregate body     | payload_size u32 | embedded.. | cosignature [96].. |
//! block              | header | version u16 | type u16 | height u64 | timestamp u64 |
//!                    | difficulty u64 | previous_block_hash [32] | transaction.. |
//! ```

use bytes::Bytes;
use std::fmt;

use crate::crypto::{Hash256, PublicKey, Signature, HASH_SIZE, KEY_SIZE, SIGNATURE_SIZE};
use crate::error::EntityError;
use crate::types::{Amount, Difficulty, EntityType, Height, Timestamp};

/// Size of the part of every top-level entity that is excluded from signing.
pub const VERIFIABLE_HEADER_SIZE: usize = 4 + SIGNATURE_SIZE + KEY_SIZE;

/// Size of the fixed part of a top-level transaction.
pub const TRANSACTION_HEADER_SIZE: usize = VERIFIABLE_HEADER_SIZE + 2 + 2 + 8 + 8;

/// Size of the fixed part of an embedded transaction.
pub const EMBEDDED_HEADER_SIZE: usize = 4 + KEY_SIZE + 2 + 2;

/// Size of the fixed part of an aggregate transaction.
pub const AGGREGATE_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + 4;

/// Size of a detached cosignature (signer followed by signature).
pub const COSIGNATURE_SIZE: usize = KEY_SIZE + SIGNATURE_SIZE;

/// Size of the fixed part of a block.
pub const BLOCK_HEADER_SIZE: usize = VERIFIABLE_HEADER_SIZE + 2 + 2 + 8 + 8 + 8 + HASH_SIZE;

/// Field offsets shared by all top-level entities.
pub mod offsets {
    pub const SIZE: usize = 0;
    pub const SIGNATURE: usize = 4;
    pub const SIGNER: usize = 68;
    pub const VERSION: usize = 100;
    pub const TYPE: usize = 102;

    pub const FEE: usize = 104;
    pub const DEADLINE: usize = 112;
    pub const PAYLOAD_SIZE: usize = 120;

    pub const BLOCK_HEIGHT: usize = 104;
    pub const BLOCK_TIMESTAMP: usize = 112;
    pub const BLOCK_DIFFICULTY: usize = 120;
    pub const BLOCK_PREVIOUS_HASH: usize = 128;

    pub const EMBEDDED_SIZE: usize = 0;
    pub const EMBEDDED_SIGNER: usize = 4;
    pub const EMBEDDED_VERSION: usize = 36;
    pub const EMBEDDED_TYPE: usize = 38;
}

/// Length-checked little-endian cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct EntityReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> EntityReader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `pos`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Borrow the next `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], EntityError> {
        let available = self.remaining();
        if len > available {
            return Err(EntityError::Truncated {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Borrow everything after the cursor.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let start = self.pos.min(self.buf.len());
        self.pos = self.buf.len();
        &self.buf[start..]
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EntityError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, EntityError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, EntityError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, EntityError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, EntityError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }
}

/// Copy `N` bytes at `offset`. Callers guarantee the range was bounds-checked.
fn array_at<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(array_at(buf, offset))
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(array_at(buf, offset))
}

fn u64_at(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(array_at(buf, offset))
}

/// Check the declared size field against the actual buffer length.
fn check_declared_size(buf: &[u8], minimum: usize) -> Result<(), EntityError> {
    if buf.len() < minimum {
        return Err(EntityError::Truncated {
            offset: 0,
            needed: minimum,
            available: buf.len(),
        });
    }
    let declared = u32_at(buf, offsets::SIZE) as u64;
    if declared != buf.len() as u64 {
        return Err(EntityError::SizeMismatch {
            declared,
            actual: buf.len() as u64,
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level transaction
// ─────────────────────────────────────────────────────────────────────────────

/// A top-level transaction over an owned, immutable buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    bytes: Bytes,
}

impl Transaction {
    /// Wrap a buffer, checking the fixed header and the declared size.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, EntityError> {
        let bytes = bytes.into();
        check_declared_size(&bytes, TRANSACTION_HEADER_SIZE)?;
        Ok(Self { bytes })
    }

    /// Wrap a buffer produced by a builder in this crate.
    pub(crate) fn from_trusted(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// The declared size (equal to the buffer length once parsed).
    pub fn size(&self) -> u32 {
        u32_at(&self.bytes, offsets::SIZE)
    }

    pub fn signature(&self) -> Signature {
        Signature(array_at(&self.bytes, offsets::SIGNATURE))
    }

    pub fn signer(&self) -> PublicKey {
        PublicKey(array_at(&self.bytes, offsets::SIGNER))
    }

    pub fn version(&self) -> u16 {
        u16_at(&self.bytes, offsets::VERSION)
    }

    pub fn entity_type(&self) -> EntityType {
        EntityType(u16_at(&self.bytes, offsets::TYPE))
    }

    pub fn fee(&self) -> Amount {
        Amount(u64_at(&self.bytes, offsets::FEE))
    }

    pub fn deadline(&self) -> Timestamp {
        Timestamp(u64_at(&self.bytes, offsets::DEADLINE))
    }

    /// The type-specific body following the transaction header.
    pub fn body(&self) -> &[u8] {
        &self.bytes[TRANSACTION_HEADER_SIZE..]
    }

    /// The whole entity.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes past the verifiable header (the default signed region).
    pub fn signed_region(&self) -> &[u8] {
        &self.bytes[VERIFIABLE_HEADER_SIZE..]
    }

    /// Share the underlying buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("type", &self.entity_type())
            .field("size", &self.size())
            .field("signer", &self.signer())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedded transaction
// ─────────────────────────────────────────────────────────────────────────────

/// A transaction embedded in an aggregate; borrows from the aggregate buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedTransaction<'a> {
    bytes: &'a [u8],
}

impl<'a> EmbeddedTransaction<'a> {
    /// Wrap a slice holding exactly one embedded transaction.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, EntityError> {
        check_declared_size(bytes, EMBEDDED_HEADER_SIZE)?;
        Ok(Self { bytes })
    }

    pub fn size(&self) -> u32 {
        u32_at(self.bytes, offsets::EMBEDDED_SIZE)
    }

    pub fn signer(&self) -> PublicKey {
        PublicKey(array_at(self.bytes, offsets::EMBEDDED_SIGNER))
    }

    pub fn version(&self) -> u16 {
        u16_at(self.bytes, offsets::EMBEDDED_VERSION)
    }

    pub fn entity_type(&self) -> EntityType {
        EntityType(u16_at(self.bytes, offsets::EMBEDDED_TYPE))
    }

    /// The type-specific body following the embedded header.
    pub fn body(&self) -> &'a [u8] {
        &self.bytes[EMBEDDED_HEADER_SIZE..]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl fmt::Debug for EmbeddedTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedTransaction")
            .field("type", &self.entity_type())
            .field("size", &self.size())
            .field("signer", &self.signer())
            .finish()
    }
}

/// The embedded-transaction region of an aggregate, validated to tile exactly.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedTransactions<'a> {
    region: &'a [u8],
    count: usize,
}

impl<'a> EmbeddedTransactions<'a> {
    /// Walk `region`, checking every embedded size so later iteration is infallible.
    pub fn parse(region: &'a [u8]) -> Result<Self, EntityError> {
        let mut offset = 0;
        let mut count = 0;
        while offset < region.len() {
            let mut reader = EntityReader::at(region, offset);
            let size = reader.read_u32()?;
            if (size as usize) < EMBEDDED_HEADER_SIZE {
                return Err(EntityError::InvalidEmbeddedSize { offset, size });
            }
            let end = offset + size as usize;
            if end > region.len() {
                return Err(EntityError::PayloadSizeMismatch {
                    declared: region.len() as u32,
                    actual: end,
                });
            }
            offset = end;
            count += 1;
        }
        Ok(Self { region, count })
    }

    /// Number of embedded transactions.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The raw region, or `None` when empty.
    pub fn region(&self) -> Option<&'a [u8]> {
        (!self.region.is_empty()).then_some(self.region)
    }

    pub fn iter(&self) -> EmbeddedTransactionsIter<'a> {
        EmbeddedTransactionsIter {
            remaining: self.region,
        }
    }
}

impl fmt::Debug for EmbeddedTransactions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for EmbeddedTransactions<'a> {
    type Item = EmbeddedTransaction<'a>;
    type IntoIter = EmbeddedTransactionsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a validated embedded-transaction region.
#[derive(Debug, Clone)]
pub struct EmbeddedTransactionsIter<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for EmbeddedTransactionsIter<'a> {
    type Item = EmbeddedTransaction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.len() < EMBEDDED_HEADER_SIZE {
            return None;
        }
        let size = u32_at(self.remaining, offsets::EMBEDDED_SIZE) as usize;
        if size < EMBEDDED_HEADER_SIZE || size > self.remaining.len() {
            return None;
        }
        let (current, rest) = self.remaining.split_at(size);
        self.remaining = rest;
        Some(EmbeddedTransaction { bytes: current })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cosignatures
// ─────────────────────────────────────────────────────────────────────────────

/// A detached cosignature appended to an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cosignature {
    pub signer: PublicKey,
    pub signature: Signature,
}

/// The trailing cosignature region of an aggregate.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cosignatures<'a> {
    region: &'a [u8],
}

impl<'a> Cosignatures<'a> {
    /// Wrap a region that must hold a whole number of cosignatures.
    pub fn parse(region: &'a [u8]) -> Result<Self, EntityError> {
        if region.len() % COSIGNATURE_SIZE != 0 {
            return Err(EntityError::PartialCosignature(region.len()));
        }
        Ok(Self { region })
    }

    pub fn len(&self) -> usize {
        self.region.len() / COSIGNATURE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// The raw region, or `None` when empty.
    pub fn region(&self) -> Option<&'a [u8]> {
        (!self.region.is_empty()).then_some(self.region)
    }

    pub fn iter(&self) -> impl Iterator<Item = Cosignature> + 'a {
        self.region.chunks_exact(COSIGNATURE_SIZE).map(|chunk| Cosignature {
            signer: PublicKey(array_at(chunk, 0)),
            signature: Signature(array_at(chunk, KEY_SIZE)),
        })
    }

    /// The signer key bytes of each cosignature, borrowed in storage order.
    pub fn signer_buffers(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.region
            .chunks_exact(COSIGNATURE_SIZE)
            .map(|chunk| &chunk[..KEY_SIZE])
    }

    /// Check whether `key` cosigned.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.signer_buffers().any(|signer| signer == key.as_bytes())
    }
}

impl fmt::Debug for Cosignatures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Structured view of an aggregate transaction.
#[derive(Debug, Clone, Copy)]
pub struct AggregateTransaction<'a> {
    transaction: &'a Transaction,
    payload_size: u32,
    transactions: EmbeddedTransactions<'a>,
    cosignatures: Cosignatures<'a>,
}

impl<'a> AggregateTransaction<'a> {
    /// Parse the aggregate body, validating the embedded and cosignature regions.
    pub fn parse(transaction: &'a Transaction) -> Result<Self, EntityError> {
        let entity_type = transaction.entity_type();
        if entity_type != EntityType::AGGREGATE {
            return Err(EntityError::UnexpectedType {
                expected: EntityType::AGGREGATE,
                actual: entity_type,
            });
        }

        let mut reader = EntityReader::at(transaction.as_bytes(), offsets::PAYLOAD_SIZE);
        let payload_size = reader.read_u32()?;
        let payload = reader.read_slice(payload_size as usize)?;
        let cosignatures = Cosignatures::parse(reader.read_rest())?;
        let transactions = EmbeddedTransactions::parse(payload)?;

        Ok(Self {
            transaction,
            payload_size,
            transactions,
            cosignatures,
        })
    }

    pub fn signer(&self) -> PublicKey {
        self.transaction.signer()
    }

    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    pub fn transactions(&self) -> EmbeddedTransactions<'a> {
        self.transactions
    }

    pub fn cosignatures(&self) -> Cosignatures<'a> {
        self.cosignatures
    }

    /// Everything past the verifiable header up to the end of the last
    /// embedded transaction; cosignatures are excluded.
    pub fn data_buffer(&self) -> &'a [u8] {
        let end = AGGREGATE_HEADER_SIZE + self.payload_size as usize;
        &self.transaction.as_bytes()[VERIFIABLE_HEADER_SIZE..end]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block
// ─────────────────────────────────────────────────────────────────────────────

/// A block over an owned, immutable buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    bytes: Bytes,
}

impl Block {
    /// Wrap a buffer, checking the fixed header, declared size and type.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, EntityError> {
        let bytes = bytes.into();
        check_declared_size(&bytes, BLOCK_HEADER_SIZE)?;
        let entity_type = EntityType(u16_at(&bytes, offsets::TYPE));
        if entity_type != EntityType::BLOCK {
            return Err(EntityError::UnexpectedType {
                expected: EntityType::BLOCK,
                actual: entity_type,
            });
        }
        Ok(Self { bytes })
    }

    pub(crate) fn from_trusted(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn size(&self) -> u32 {
        u32_at(&self.bytes, offsets::SIZE)
    }

    pub fn signature(&self) -> Signature {
        Signature(array_at(&self.bytes, offsets::SIGNATURE))
    }

    pub fn signer(&self) -> PublicKey {
        PublicKey(array_at(&self.bytes, offsets::SIGNER))
    }

    pub fn version(&self) -> u16 {
        u16_at(&self.bytes, offsets::VERSION)
    }

    pub fn height(&self) -> Height {
        Height(u64_at(&self.bytes, offsets::BLOCK_HEIGHT))
    }

    pub fn timestamp(&self) -> Timestamp {
        Timestamp(u64_at(&self.bytes, offsets::BLOCK_TIMESTAMP))
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty(u64_at(&self.bytes, offsets::BLOCK_DIFFICULTY))
    }

    pub fn previous_block_hash(&self) -> Hash256 {
        Hash256(array_at(&self.bytes, offsets::BLOCK_PREVIOUS_HASH))
    }

    /// The signed block header (transactions are covered by their own signatures).
    pub fn header_data(&self) -> &[u8] {
        &self.bytes[VERIFIABLE_HEADER_SIZE..BLOCK_HEADER_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero-copy iterator over the contained transactions.
    ///
    /// Yields an error and stops when a transaction does not fit.
    pub fn transactions(&self) -> BlockTransactions {
        BlockTransactions {
            bytes: self.bytes.clone(),
            offset: BLOCK_HEADER_SIZE,
            failed: false,
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("height", &self.height())
            .field("size", &self.size())
            .field("signer", &self.signer())
            .finish()
    }
}

/// Iterator over the transactions of a block.
#[derive(Debug, Clone)]
pub struct BlockTransactions {
    bytes: Bytes,
    offset: usize,
    failed: bool,
}

impl Iterator for BlockTransactions {
    type Item = Result<Transaction, EntityError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }

        let result = EntityReader::at(&self.bytes, self.offset)
            .read_u32()
            .and_then(|size| {
                let size = size as usize;
                let available = self.bytes.len() - self.offset;
                if size > available {
                    return Err(EntityError::Truncated {
                        offset: self.offset,
                        needed: size,
                        available,
                    });
                }
                let slice = self.bytes.slice(self.offset..self.offset + size);
                self.offset += size;
                Transaction::from_bytes(slice)
            });

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
