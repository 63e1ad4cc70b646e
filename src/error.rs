//! Error types for tile-reduce operations

use thiserror::Error;

use crate::Backend;

/// Result type for tile-reduce operations
pub type Result<T> = std::result::Result<T, ReduceError>;

/// Errors reported by the safe reduction API
///
/// The kernels themselves cannot fail; these variants describe preconditions
/// the safe API checks before entering a kernel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReduceError {
    /// Backend not supported on this CPU
    #[error("Backend not supported on this platform: {0:?}")]
    UnsupportedBackend(Backend),

    /// Input length is not a multiple of the vector width
    #[error("Misaligned length: {len} is not a multiple of {width}")]
    MisalignedLength {
        /// Number of elements supplied
        len: usize,
        /// Required vector width
        width: usize,
    },
}
