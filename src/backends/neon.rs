//! ARM NEON backend implementation (aarch64 128-bit SIMD)
//!
//! The 16-lane accumulator is held in four `int32x4_t` registers. Collapsing
//! the tree folds registers 2-3 onto 0-1 (8 lanes), then 1 onto 0 (4 lanes),
//! then the register halves (2 lanes) and finally a pairwise add (1 lane).
//!
//! # Safety
//!
//! All NEON intrinsics are marked `unsafe` by Rust. Callers must check for NEON
//! support before dispatching here (see [`crate::Backend::is_available`]).

use std::arch::aarch64::*;

use super::ReduceBackend;
use crate::VECTOR_WIDTH;

/// ARM NEON backend (16 lanes in four 128-bit registers)
pub struct NeonBackend;

impl ReduceBackend for NeonBackend {
    const LANES: usize = VECTOR_WIDTH;

    #[target_feature(enable = "neon")]
    unsafe fn reduce_add(a: &[i32]) -> i32 {
        debug_assert_eq!(a.len() % VECTOR_WIDTH, 0, "length must be lane aligned");

        let len = a.len();
        let mut i = 0;

        let mut acc0 = vdupq_n_s32(0);
        let mut acc1 = vdupq_n_s32(0);
        let mut acc2 = vdupq_n_s32(0);
        let mut acc3 = vdupq_n_s32(0);

        // Process 16 elements per stride
        while i + VECTOR_WIDTH <= len {
            let p = a.as_ptr().add(i);
            acc0 = vaddq_s32(acc0, vld1q_s32(p));
            acc1 = vaddq_s32(acc1, vld1q_s32(p.add(4)));
            acc2 = vaddq_s32(acc2, vld1q_s32(p.add(8)));
            acc3 = vaddq_s32(acc3, vld1q_s32(p.add(12)));
            i += VECTOR_WIDTH;
        }

        // Shift by 8 lanes
        let sum8_lo = vaddq_s32(acc0, acc2);
        let sum8_hi = vaddq_s32(acc1, acc3);

        // Shift by 4 lanes
        let sum4 = vaddq_s32(sum8_lo, sum8_hi);

        // Shift by 2 lanes
        let sum2 = vadd_s32(vget_low_s32(sum4), vget_high_s32(sum4));

        // Shift by 1 lane
        let sum1 = vpadd_s32(sum2, sum2);

        vget_lane_s32::<0>(sum1)
    }
}
