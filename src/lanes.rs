//! 16-lane i32 register model
//!
//! [`LaneVector`] is the portable stand-in for a 512-bit integer vector register.
//! Every operation is lane-wise and wrapping; the only cross-lane operation is
//! [`LaneVector::shift_lanes`], which the tree collapse is built from.

use crate::VECTOR_WIDTH;

/// Number of shift-and-add steps needed to collapse 16 lanes (log2 of the width)
pub const COLLAPSE_DEPTH: usize = VECTOR_WIDTH.trailing_zeros() as usize;

/// Shift distances of the tree collapse, in lanes: 8, 4, 2, 1
pub const COLLAPSE_SHIFTS: [usize; COLLAPSE_DEPTH] = [
    VECTOR_WIDTH / 2,
    VECTOR_WIDTH / 4,
    VECTOR_WIDTH / 8,
    VECTOR_WIDTH / 16,
];

/// A 16-wide vector of i32 lanes
///
/// # Examples
///
/// ```
/// use tile_reduce::LaneVector;
///
/// let v = LaneVector::splat(1);
/// assert_eq!(v.collapse(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C, align(64))]
pub struct LaneVector([i32; VECTOR_WIDTH]);

impl LaneVector {
    /// All lanes zero
    pub const fn zero() -> Self {
        Self([0; VECTOR_WIDTH])
    }

    /// Broadcast `value` to every lane
    pub const fn splat(value: i32) -> Self {
        Self([value; VECTOR_WIDTH])
    }

    /// Load 16 contiguous values
    #[inline(always)]
    pub fn load(chunk: &[i32; VECTOR_WIDTH]) -> Self {
        Self(*chunk)
    }

    /// Load the first 16 values of `data`
    ///
    /// Returns `None` if `data` holds fewer than 16 values.
    pub fn from_slice(data: &[i32]) -> Option<Self> {
        let chunk: &[i32; VECTOR_WIDTH] = data.get(..VECTOR_WIDTH)?.try_into().ok()?;
        Some(Self::load(chunk))
    }

    /// Lane values
    pub fn lanes(&self) -> &[i32; VECTOR_WIDTH] {
        &self.0
    }

    /// Value held in `lane`
    ///
    /// # Panics
    ///
    /// Panics if `lane >= 16`.
    pub fn extract(&self, lane: usize) -> i32 {
        self.0[lane]
    }

    /// Lane-wise wrapping addition, no cross-lane interaction
    #[inline(always)]
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0.iter()) {
            *o = o.wrapping_add(*b);
        }
        Self(out)
    }

    /// Move every lane down by `n` lanes, zero-filling the top `n` lanes
    ///
    /// Lane `i` of the result holds lane `i + n` of `self`. Shifting by 16 or
    /// more yields all zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_reduce::LaneVector;
    ///
    /// let v = LaneVector::load(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
    /// let shifted = v.shift_lanes(8);
    /// assert_eq!(shifted.extract(0), 8);
    /// assert_eq!(shifted.extract(8), 0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn shift_lanes(self, n: usize) -> Self {
        let mut out = [0; VECTOR_WIDTH];
        if n < VECTOR_WIDTH {
            out[..VECTOR_WIDTH - n].copy_from_slice(&self.0[n..]);
        }
        Self(out)
    }

    /// Collapse all lanes into one scalar with the shift-and-add tree
    #[inline(always)]
    pub fn collapse(self) -> i32 {
        let mut v = self;
        for shift in COLLAPSE_SHIFTS {
            v = v.add(v.shift_lanes(shift));
        }
        v.extract(0)
    }

    /// The intermediate vector after each collapse step
    ///
    /// After step `s` (shift `16 >> (s + 1)`), lanes `0..shift` each hold a
    /// partial sum of `2^(s + 1)` original lanes.
    pub fn collapse_steps(self) -> [LaneVector; COLLAPSE_DEPTH] {
        let mut steps = [LaneVector::zero(); COLLAPSE_DEPTH];
        let mut v = self;
        for (step, shift) in steps.iter_mut().zip(COLLAPSE_SHIFTS) {
            v = v.add(v.shift_lanes(shift));
            *step = v;
        }
        steps
    }
}
