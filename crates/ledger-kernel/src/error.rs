//! Error types for the Kernel.

use ledger_kernel_cache::CacheError;
use ledger_kernel_core::CoreError;
use ledger_kernel_plugins::PluginError;
use thiserror::Error;

/// Errors that can occur during Kernel operations.
///
/// Rejected and unprocessable entities are not errors; they are reported as a
/// [`Verdict`](crate::Verdict).
#[derive(Debug, Error)]
pub enum KernelError {
    /// Invalid chain configuration.
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    /// Plugin registration failed.
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// Cache consistency, observer or projection failure.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type for Kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
