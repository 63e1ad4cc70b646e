//! Portable 16-lane backend
//!
//! Accumulates into a [`LaneVector`] one 16-element stride at a time and then
//! collapses the lanes with the shift-and-add tree. The fixed-size array loop
//! is simple enough for the compiler to map onto whatever SIMD width the
//! target offers.

use super::ReduceBackend;
use crate::lanes::LaneVector;
use crate::VECTOR_WIDTH;

/// Portable lane backend (works on every target)
pub struct PortableBackend;

impl ReduceBackend for PortableBackend {
    const LANES: usize = VECTOR_WIDTH;

    // SAFETY: This function is safe because:
    // 1. Strides are taken with `chunks_exact`, so every load is in bounds
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match ReduceBackend trait interface
    unsafe fn reduce_add(a: &[i32]) -> i32 {
        debug_assert_eq!(a.len() % VECTOR_WIDTH, 0, "length must be lane aligned");

        let mut running_total = LaneVector::zero();
        let mut chunk = [0; VECTOR_WIDTH];
        for stride in a.chunks_exact(VECTOR_WIDTH) {
            chunk.copy_from_slice(stride);
            running_total = running_total.add(LaneVector::load(&chunk));
        }

        running_total.collapse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_empty() {
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&[]) };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_portable_single_stride() {
        let a = [1; 16];
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&a) };
        assert_eq!(result, 16);
    }

    #[test]
    fn test_portable_multi_stride() {
        let a: Vec<i32> = (0..32).collect();
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&a) };
        assert_eq!(result, 496);
    }

    #[test]
    fn test_portable_every_stride_counted() {
        // Stride k holds the value 10^k in lane k, so a skipped stride shows up
        // as a missing digit
        let mut a = [0; 64];
        for stride in 0..4 {
            a[stride * 16 + stride] = 10i32.pow(stride as u32);
        }
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&a) };
        assert_eq!(result, 1111);
    }

    #[test]
    fn test_portable_negative() {
        let mut a = [0; 16];
        a[..4].copy_from_slice(&[-5, 3, -2, 4]);
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&a) };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_portable_wraps() {
        let a = [i32::MAX; 32];
        let expected = a.iter().fold(0i32, |acc, &x| acc.wrapping_add(x));
        // SAFETY: Test code calling backend trait methods marked unsafe
        let result = unsafe { PortableBackend::reduce_add(&a) };
        assert_eq!(result, expected);
    }
}
