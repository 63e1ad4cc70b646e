//! tile-reduce: i32 Sum Reduction Kernels
//!
//! **tile-reduce** sums a contiguous run of 32-bit signed integers with one of two
//! functionally equivalent entry points:
//!
//! 1. **Scalar** - a single accumulator walking the buffer in index order
//! 2. **Vector** - a 16-lane accumulator followed by a 4-step shift-and-add tree
//!
//! Both wrap on overflow and produce bit-identical results for any input whose
//! length is a multiple of [`VECTOR_WIDTH`].
//!
//! # Design Principles
//!
//! - **One algorithm, several backends**: portable lanes, AVX2 (x86_64), NEON (aarch64)
//! - **Runtime dispatch**: the vector path auto-selects the best backend for the CPU
//! - **Zero unsafe in the safe API**: `unsafe` is confined to backends and [`ffi`]
//! - **Markers, not logging, in the hot path**: start/end events go through an
//!   injected [`markers::EventMarkers`] sink
//!
//! # Quick Start
//!
//! ```rust
//! use tile_reduce::{reduce_add_scalar, reduce_add_vector};
//!
//! let data: Vec<i32> = (0..32).collect();
//!
//! assert_eq!(reduce_add_scalar(&data), 496);
//! assert_eq!(reduce_add_vector(&data).unwrap(), 496);
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod ffi;
pub mod kernel;
pub mod lanes;
pub mod markers;

pub use config::KernelConfig;
pub use error::{ReduceError, Result};
pub use kernel::{reduce_add_scalar, reduce_add_vector, ReduceKernel};
pub use lanes::LaneVector;

/// Number of i32 lanes in one vector register
pub const VECTOR_WIDTH: usize = 16;

/// Backend execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Sequential accumulation (no lanes)
    Scalar,
    /// Portable 16-lane array, auto-vectorized by the compiler
    Portable,
    /// AVX2 (two 256-bit registers per 16 lanes)
    AVX2,
    /// ARM NEON (four 128-bit registers per 16 lanes)
    NEON,
    /// Auto-select best available
    Auto,
}

impl Backend {
    /// Select the best available backend for the current platform
    ///
    /// This is a convenience wrapper around `select_best_available_backend()`
    pub fn select_best() -> Self {
        select_best_available_backend()
    }

    /// Whether this backend can run on the current CPU
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_reduce::Backend;
    ///
    /// assert!(Backend::Scalar.is_available());
    /// assert!(Backend::Portable.is_available());
    /// ```
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Portable | Backend::Auto => true,
            Backend::AVX2 => has_avx2(),
            Backend::NEON => has_neon(),
        }
    }

    /// Resolve `Auto` into a concrete backend
    pub fn resolve(self) -> Self {
        match self {
            Backend::Auto => select_best_available_backend(),
            other => other,
        }
    }
}

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
fn has_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
fn has_avx2() -> bool {
    false
}

#[cfg(target_arch = "aarch64")]
fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(target_arch = "aarch64"))]
fn has_neon() -> bool {
    false
}

/// Select the best available backend for the current platform
///
/// Performs runtime CPU feature detection in this order:
///
/// **x86/x86_64**: AVX2 if detected, else Portable
///
/// **aarch64**: NEON if detected, else Portable
///
/// **Other platforms**: Portable
///
/// `Scalar` is never selected here: it is the reference path, not a lane backend.
///
/// # Examples
///
/// ```
/// use tile_reduce::{select_best_available_backend, Backend};
///
/// let backend = select_best_available_backend();
/// assert_ne!(backend, Backend::Auto);
/// ```
pub fn select_best_available_backend() -> Backend {
    if has_avx2() {
        return Backend::AVX2;
    }
    if has_neon() {
        return Backend::NEON;
    }
    Backend::Portable
}
