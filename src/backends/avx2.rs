//! AVX2 backend implementation (x86 256-bit SIMD)
//!
//! The 16-lane accumulator is held in two `__m256i` registers: lanes 0-7 and
//! lanes 8-15. The tree collapse then narrows register width at each step, so
//! every shift in the tree is either a register split or a byte shift.
//!
//! # Performance
//!
//! Two independent accumulators per stride keep both vector add ports busy.
//!
//! # Safety
//!
//! All AVX2 intrinsics are marked `unsafe` by Rust. Callers must check for AVX2
//! support before dispatching here (see [`crate::Backend::is_available`]).

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::ReduceBackend;
use crate::VECTOR_WIDTH;

/// AVX2 backend (16 lanes in two 256-bit registers)
pub struct Avx2Backend;

impl ReduceBackend for Avx2Backend {
    const LANES: usize = VECTOR_WIDTH;

    #[target_feature(enable = "avx2")]
    unsafe fn reduce_add(a: &[i32]) -> i32 {
        debug_assert_eq!(a.len() % VECTOR_WIDTH, 0, "length must be lane aligned");

        let len = a.len();
        let mut i = 0;

        let mut acc_lo = _mm256_setzero_si256();
        let mut acc_hi = _mm256_setzero_si256();

        // Process 16 elements per stride
        while i + VECTOR_WIDTH <= len {
            let lo = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let hi = _mm256_loadu_si256(a.as_ptr().add(i + 8) as *const __m256i);
            acc_lo = _mm256_add_epi32(acc_lo, lo);
            acc_hi = _mm256_add_epi32(acc_hi, hi);
            i += VECTOR_WIDTH;
        }

        // Shift by 8 lanes: fold the upper register onto the lower one
        let sum8 = _mm256_add_epi32(acc_lo, acc_hi);

        // Shift by 4 lanes: fold the upper 128-bit half
        let sum4 = _mm_add_epi32(
            _mm256_castsi256_si128(sum8),
            _mm256_extracti128_si256(sum8, 1),
        );

        // Shift by 2 lanes (8 bytes)
        let sum2 = _mm_add_epi32(sum4, _mm_srli_si128(sum4, 8));

        // Shift by 1 lane (4 bytes)
        let sum1 = _mm_add_epi32(sum2, _mm_srli_si128(sum2, 4));

        _mm_cvtsi128_si32(sum1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avx2_available() -> bool {
        is_x86_feature_detected!("avx2")
    }

    #[test]
    fn test_avx2_single_stride() {
        if !avx2_available() {
            eprintln!("Skipping AVX2 test: CPU does not support AVX2");
            return;
        }

        let a = [1; 16];
        // SAFETY: AVX2 support checked above
        let result = unsafe { Avx2Backend::reduce_add(&a) };
        assert_eq!(result, 16);
    }

    #[test]
    fn test_avx2_multi_stride() {
        if !avx2_available() {
            eprintln!("Skipping AVX2 test: CPU does not support AVX2");
            return;
        }

        let a: Vec<i32> = (0..32).collect();
        // SAFETY: AVX2 support checked above
        let result = unsafe { Avx2Backend::reduce_add(&a) };
        assert_eq!(result, 496);
    }

    #[test]
    fn test_avx2_lane_positions() {
        if !avx2_available() {
            return;
        }

        // A single non-zero lane must survive the collapse from every position
        for lane in 0..VECTOR_WIDTH {
            let mut a = [0; 16];
            a[lane] = 1 << lane;
            // SAFETY: AVX2 support checked above
            let result = unsafe { Avx2Backend::reduce_add(&a) };
            assert_eq!(result, 1 << lane, "lane {lane} lost in collapse");
        }
    }

    #[test]
    fn test_avx2_wraps() {
        if !avx2_available() {
            return;
        }

        let a = [i32::MIN; 48];
        let expected = a.iter().fold(0i32, |acc, &x| acc.wrapping_add(x));
        // SAFETY: AVX2 support checked above
        let result = unsafe { Avx2Backend::reduce_add(&a) };
        assert_eq!(result, expected);
    }
}
