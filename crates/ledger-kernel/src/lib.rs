//! # Ledger Kernel
//!
//! The unified API for validating ledger entities and maintaining versioned
//! ledger state.
//!
//! ## Overview
//!
//! - **Entities**: Self-sized binary transactions and blocks, decomposed by plugins
//! - **Notifications**: Typed facts published in a fixed order per entity
//! - **Validators**: Pure rules over notifications, short-circuiting on failure
//! - **Cache**: Views, deltas and sequential commits by block height
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_kernel::{BlockOutcome, Kernel, KernelConfig};
//! use ledger_kernel::core::Height;
//!
//! async fn example(block_bytes: Vec<u8>, transaction_bytes: Vec<u8>) {
//!     let kernel = Kernel::new(KernelConfig::default()).unwrap();
//!
//!     // Check a transaction against the committed state
//!     let verdict = kernel.validate_transaction(transaction_bytes, Height(2));
//!     println!("{verdict:?}");
//!
//!     // Execute and commit a block
//!     match kernel.process_block(block_bytes).await.unwrap() {
//!         BlockOutcome::Committed(summary) => println!("committed {}", summary.version),
//!         BlockOutcome::Rejected(verdict) => println!("rejected: {verdict:?}"),
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ledger_kernel::core` - Entity layout, notifications, configuration
//! - `ledger_kernel::plugins` - Transaction plugins and publishing
//! - `ledger_kernel::cache` - Versioned cache and difficulty projection
//! - `ledger_kernel::validators` - Validator engine and rules

pub mod error;
pub mod kernel;
pub mod observers;

pub use ledger_kernel_cache as cache;
pub use ledger_kernel_core as core;
pub use ledger_kernel_plugins as plugins;
pub use ledger_kernel_validators as validators;

pub use error::{KernelError, Result};
pub use kernel::{BlockOutcome, Kernel, KernelConfig, Verdict};
pub use observers::StateObserver;

pub use ledger_kernel_core::{
    Block, ChainConfiguration, Height, Keypair, Notification, PublicKey, Transaction,
};
pub use ledger_kernel_validators::{FailureCode, ValidationResult};
