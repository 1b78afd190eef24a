//! # Ledger Kernel Testkit
//!
//! Testing utilities for the Ledger Kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A seeded cache with an eligible harvester and funded accounts,
//!   plus builders for signed transfers, artifact definitions, aggregates and blocks
//! - **Mocks**: A minimal embeddable plugin and an aggregate builder over it
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use ledger_kernel_core::{Amount, AssetId};
//! use ledger_kernel_testkit::fixtures::{transfer, ChainFixture};
//!
//! # async fn example() {
//! let fixture = ChainFixture::new(2);
//! let kernel = fixture.kernel();
//! let tx = transfer(
//!     fixture.account(0),
//!     fixture.account(1).public_key(),
//!     AssetId(0),
//!     Amount(10),
//! );
//! let outcome = kernel.process_block(fixture.next_block(vec![tx])).await.unwrap();
//! assert!(outcome.is_committed());
//! # }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledger_kernel_testkit::generators::{aggregate_from_params, AggregateParams};
//!
//! proptest! {
//!     #[test]
//!     fn aggregate_size_is_consistent(params: AggregateParams) {
//!         let tx = aggregate_from_params(&params);
//!         prop_assert_eq!(tx.size() as usize, tx.as_bytes().len());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use fixtures::{funded_keypairs, ChainFixture, GENESIS_HEIGHT, INITIAL_BALANCE};
pub use generators::{aggregate_from_params, AggregateParams};
pub use mocks::{
    mock_aggregate_plugin, mock_registry, MockAggregateBuilder, MockBody, MockPlugin,
    MOCK_ENTITY_TYPE, NOTIFICATIONS_PER_EMBEDDED_MOCK,
};
