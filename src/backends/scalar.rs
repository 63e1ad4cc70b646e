//! Scalar (non-SIMD) backend implementation
//!
//! This is the portable baseline: one accumulator, one element per step, in
//! index order. It accepts any length and serves as the correctness reference
//! for the lane backends.

use super::ReduceBackend;

/// Scalar backend (sequential, no lanes)
pub struct ScalarBackend;

impl ReduceBackend for ScalarBackend {
    const LANES: usize = 1;

    // SAFETY: This function is safe because:
    // 1. All slice accesses go through the Rust iterator
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match ReduceBackend trait interface
    unsafe fn reduce_add(a: &[i32]) -> i32 {
        let mut running_total: i32 = 0;
        for &val in a {
            running_total = running_total.wrapping_add(val);
        }
        running_total
    }
}
