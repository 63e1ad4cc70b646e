//! C ABI entry points
//!
//! Exported with unmangled names so a host runtime can call them directly:
//!
//! ```c
//! void reduce_add_scalar(int32_t *a_in, int32_t *c_out, int32_t input_size);
//! void reduce_add_vector(int32_t *a_in, int32_t *c_out, int32_t input_size);
//! ```
//!
//! These functions perform no validation. Preconditions are the caller's
//! responsibility and are only asserted in debug builds. The end marker fires
//! after `*c_out` has been written.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::kernel::{default_kernel, ReduceKernel};
use crate::markers::MarkerGuard;
use crate::VECTOR_WIDTH;

/// Borrow the caller's buffer as a slice
///
/// # Safety
///
/// `a_in` must point to `input_size` readable, initialized `i32` values
/// (it may dangle when `input_size == 0`).
unsafe fn input_slice<'a>(a_in: *const i32, input_size: i32) -> &'a [i32] {
    debug_assert!(input_size >= 0, "input_size must be non-negative");
    let len = input_size as usize;
    if len == 0 {
        return &[];
    }
    debug_assert!(!a_in.is_null(), "a_in must not be null");
    std::slice::from_raw_parts(a_in, len)
}

/// Scalar sum written through `c_out`, bracketed by `kernel`'s markers
///
/// # Safety
///
/// Same as [`reduce_add_scalar`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", name = "reduce_add_scalar", skip(kernel, a_in, c_out))
)]
unsafe fn scalar_into(kernel: &ReduceKernel, a_in: *const i32, c_out: *mut i32, input_size: i32) {
    let _markers = MarkerGuard::new(kernel.markers());
    let input = input_slice(a_in, input_size);
    c_out.write(kernel.sum_scalar(input));
}

/// Lane sum written through `c_out`, bracketed by `kernel`'s markers
///
/// # Safety
///
/// Same as [`reduce_add_vector`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", name = "reduce_add_vector", skip(kernel, a_in, c_out), fields(backend = ?kernel.vector_backend()))
)]
unsafe fn vector_into(kernel: &ReduceKernel, a_in: *const i32, c_out: *mut i32, input_size: i32) {
    debug_assert_eq!(
        input_size as usize % VECTOR_WIDTH,
        0,
        "input_size must be a multiple of {VECTOR_WIDTH}"
    );
    let _markers = MarkerGuard::new(kernel.markers());
    let input = input_slice(a_in, input_size);
    c_out.write(kernel.sum_lanes(input));
}

/// Write the sum of `input_size` values at `a_in` to `*c_out`
///
/// # Safety
///
/// - `input_size >= 0`
/// - `a_in` points to `input_size` valid `i32` values
/// - `c_out` is valid for a single `i32` write
/// - The input is not mutated for the duration of the call
#[no_mangle]
pub unsafe extern "C" fn reduce_add_scalar(a_in: *const i32, c_out: *mut i32, input_size: i32) {
    scalar_into(default_kernel(), a_in, c_out, input_size);
}

/// Write the sum of `input_size` values at `a_in` to `*c_out` using 16 lanes
///
/// # Safety
///
/// - `input_size` is a non-negative multiple of 16
/// - `a_in` points to `input_size` valid `i32` values
/// - `c_out` is valid for a single `i32` write
/// - The input is not mutated for the duration of the call
#[no_mangle]
pub unsafe extern "C" fn reduce_add_vector(a_in: *const i32, c_out: *mut i32, input_size: i32) {
    vector_into(default_kernel(), a_in, c_out, input_size);
}
