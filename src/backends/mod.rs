//! Backend implementations of the i32 sum reduction
//!
//! This module contains one implementation per execution strategy. All backends
//! implement [`ReduceBackend`] so the kernel can dispatch between them.
//!
//! # Safety
//!
//! All `unsafe` code is isolated within backend implementations. The safe API in
//! [`crate::kernel`] checks preconditions before calling into a backend.
//!
//! # Backends
//!
//! - `scalar`: Sequential accumulation, the reference path
//! - `portable`: 16-lane array model, works everywhere
//! - `avx2`: x86_64 256-bit SIMD, 16 lanes held in two registers
//! - `neon`: aarch64 128-bit SIMD, 16 lanes held in four registers

pub mod portable;
pub mod scalar;

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

/// Backend trait for the sum reduction
///
/// # Safety
///
/// Implementations may use unsafe SIMD intrinsics. Callers must ensure:
/// - The CPU supports the instruction set the backend targets
/// - For lane backends (`LANES > 1`), `a.len()` is a multiple of `LANES`
pub trait ReduceBackend {
    /// Number of lanes accumulated in parallel (1 for sequential backends)
    const LANES: usize;

    /// Sum reduction with 32-bit wraparound: sum(a[i])
    ///
    /// # Safety
    ///
    /// - The backend's instruction set must be available on the running CPU
    /// - Lane backends require `a.len() % Self::LANES == 0`; trailing elements
    ///   past the last full stride are not read
    unsafe fn reduce_add(a: &[i32]) -> i32;
}
