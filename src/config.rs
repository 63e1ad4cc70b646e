//! Kernel configuration
//!
//! # Examples
//!
//! ```
//! use tile_reduce::{Backend, KernelConfig};
//!
//! // Reference preset: sequential path, markers on
//! let reference = KernelConfig::reference();
//! assert_eq!(reference.backend, Backend::Scalar);
//!
//! // Custom configuration using builder pattern
//! let custom = KernelConfig::new()
//!     .with_backend(Backend::Portable)
//!     .with_markers(false)
//!     .build();
//! assert!(!custom.emit_markers);
//! ```

use crate::Backend;

/// Configuration for a [`crate::ReduceKernel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Backend used by the vector entry point (`Auto` resolves at kernel creation)
    pub backend: Backend,
    /// Whether start/end markers are emitted
    pub emit_markers: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            emit_markers: true,
        }
    }
}

impl KernelConfig {
    /// Create a configuration with default values (auto backend, markers on)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_reduce::{Backend, KernelConfig};
    ///
    /// let config = KernelConfig::new().with_backend(Backend::Portable);
    /// assert_eq!(config.backend, Backend::Portable);
    /// ```
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Enable/disable start/end markers
    pub fn with_markers(mut self, enabled: bool) -> Self {
        self.emit_markers = enabled;
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    pub fn build(self) -> Self {
        self
    }

    /// Reference preset
    ///
    /// - Scalar backend (the vector entry point falls back to portable lanes)
    /// - Markers on
    pub fn reference() -> Self {
        Self::new().with_backend(Backend::Scalar)
    }

    /// Fastest preset
    ///
    /// - Best backend detected at runtime
    /// - Markers off
    pub fn fastest() -> Self {
        Self::new()
            .with_backend(Backend::select_best())
            .with_markers(false)
    }
}
