//! The reduction kernel: scalar and vector entry points

use std::sync::{Arc, OnceLock};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
use crate::backends::avx2::Avx2Backend;
#[cfg(target_arch = "aarch64")]
use crate::backends::neon::NeonBackend;
use crate::backends::portable::PortableBackend;
use crate::backends::scalar::ScalarBackend;
use crate::backends::ReduceBackend;
use crate::markers::{EventMarkers, MarkerGuard, NoopMarkers, TracingMarkers};
use crate::{Backend, KernelConfig, ReduceError, Result, VECTOR_WIDTH};

/// A configured i32 sum reduction kernel
///
/// The kernel holds no mutable state: it can be shared across threads and
/// called any number of times on the same buffer with the same result.
///
/// # Examples
///
/// ```
/// use tile_reduce::ReduceKernel;
///
/// let kernel = ReduceKernel::new();
/// let data = [1; 16];
///
/// assert_eq!(kernel.reduce_add_scalar(&data), 16);
/// assert_eq!(kernel.reduce_add_vector(&data).unwrap(), 16);
/// ```
#[derive(Clone)]
pub struct ReduceKernel {
    backend: Backend,
    markers: Arc<dyn EventMarkers>,
}

impl ReduceKernel {
    /// Kernel with the best available backend and `tracing` markers
    pub fn new() -> Self {
        Self {
            backend: Backend::select_best(),
            markers: Arc::new(TracingMarkers),
        }
    }

    /// Kernel built from a [`KernelConfig`]
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::UnsupportedBackend`] if the configured backend
    /// cannot run on this CPU.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        let backend = config.backend.resolve();
        if !backend.is_available() {
            return Err(ReduceError::UnsupportedBackend(backend));
        }

        let markers: Arc<dyn EventMarkers> = if config.emit_markers {
            Arc::new(TracingMarkers)
        } else {
            Arc::new(NoopMarkers)
        };

        Ok(Self { backend, markers })
    }

    /// Replace the marker sink
    pub fn with_markers<M: EventMarkers + 'static>(mut self, markers: M) -> Self {
        self.markers = Arc::new(markers);
        self
    }

    /// Replace the marker sink with a shared one
    pub fn with_shared_markers(mut self, markers: Arc<dyn EventMarkers>) -> Self {
        self.markers = markers;
        self
    }

    /// Configured backend
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Backend actually used by the vector entry point
    ///
    /// `Scalar` has no lanes, so the vector path runs the portable lanes instead.
    pub fn vector_backend(&self) -> Backend {
        match self.backend {
            Backend::Scalar | Backend::Auto => Backend::Portable,
            other => other,
        }
    }

    /// Sum any number of values with a single sequential accumulator
    ///
    /// Addition wraps on overflow. An empty input sums to 0.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", name = "reduce_add_scalar", skip(self, input), fields(len = input.len()))
    )]
    pub fn reduce_add_scalar(&self, input: &[i32]) -> i32 {
        let _markers = MarkerGuard::new(self.markers());
        self.sum_scalar(input)
    }

    /// Sum a lane-aligned input with the 16-lane accumulator and tree collapse
    ///
    /// Produces exactly the value [`Self::reduce_add_scalar`] produces for the
    /// same input.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::MisalignedLength`] if `input.len()` is not a
    /// multiple of [`VECTOR_WIDTH`]. No markers are emitted in that case.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", name = "reduce_add_vector", skip(self, input), fields(len = input.len(), backend = ?self.vector_backend()))
    )]
    pub fn reduce_add_vector(&self, input: &[i32]) -> Result<i32> {
        if input.len() % VECTOR_WIDTH != 0 {
            return Err(ReduceError::MisalignedLength {
                len: input.len(),
                width: VECTOR_WIDTH,
            });
        }

        let _markers = MarkerGuard::new(self.markers());
        Ok(self.sum_lanes(input))
    }

    /// Marker sink of this kernel
    pub(crate) fn markers(&self) -> &dyn EventMarkers {
        &*self.markers
    }

    /// Sequential sum, no markers
    pub(crate) fn sum_scalar(&self, input: &[i32]) -> i32 {
        // SAFETY: ScalarBackend needs no CPU features and accepts any length
        unsafe { ScalarBackend::reduce_add(input) }
    }

    /// Lane sum on the vector backend, no markers and no length check
    ///
    /// Elements past the last full stride are dropped from the sum.
    pub(crate) fn sum_lanes(&self, input: &[i32]) -> i32 {
        // SAFETY: every constructor only stores backends that passed
        // `is_available`, and lane backends never read past the last full stride
        unsafe { reduce_lanes(self.vector_backend(), input) }
    }

    /// Sum any input, taking the vector path when the length is lane aligned
    pub fn reduce_add(&self, input: &[i32]) -> i32 {
        match self.reduce_add_vector(input) {
            Ok(sum) => sum,
            Err(_) => self.reduce_add_scalar(input),
        }
    }
}

impl Default for ReduceKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReduceKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReduceKernel")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Dispatch to a lane backend
///
/// # Safety
///
/// `backend` must be available on this CPU.
unsafe fn reduce_lanes(backend: Backend, a: &[i32]) -> i32 {
    match backend {
        #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
        Backend::AVX2 => Avx2Backend::reduce_add(a),
        #[cfg(target_arch = "aarch64")]
        Backend::NEON => NeonBackend::reduce_add(a),
        _ => PortableBackend::reduce_add(a),
    }
}

/// Process-wide kernel used by the free functions and the C ABI
pub(crate) fn default_kernel() -> &'static ReduceKernel {
    static KERNEL: OnceLock<ReduceKernel> = OnceLock::new();
    KERNEL.get_or_init(ReduceKernel::new)
}

/// Sum `input` with the sequential accumulator
///
/// # Examples
///
/// ```
/// use tile_reduce::reduce_add_scalar;
///
/// assert_eq!(reduce_add_scalar(&[1, 2, 3]), 6);
/// assert_eq!(reduce_add_scalar(&[]), 0);
/// ```
pub fn reduce_add_scalar(input: &[i32]) -> i32 {
    default_kernel().reduce_add_scalar(input)
}

/// Sum a lane-aligned `input` with the best available lane backend
///
/// # Examples
///
/// ```
/// use tile_reduce::{reduce_add_vector, ReduceError};
///
/// let data: Vec<i32> = (0..32).collect();
/// assert_eq!(reduce_add_vector(&data).unwrap(), 496);
///
/// assert_eq!(
///     reduce_add_vector(&[1, 2, 3]),
///     Err(ReduceError::MisalignedLength { len: 3, width: 16 })
/// );
/// ```
///
/// # Errors
///
/// Returns [`ReduceError::MisalignedLength`] if `input.len()` is not a
/// multiple of [`VECTOR_WIDTH`].
pub fn reduce_add_vector(input: &[i32]) -> Result<i32> {
    default_kernel().reduce_add_vector(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::CountingMarkers;
    use proptest::prelude::*;

    fn all_kernels() -> Vec<ReduceKernel> {
        [Backend::Scalar, Backend::Portable, Backend::AVX2, Backend::NEON]
            .into_iter()
            .filter(|b| b.is_available())
            .map(|b| {
                ReduceKernel::with_config(KernelConfig::new().with_backend(b))
                    .expect("available backend")
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        for kernel in all_kernels() {
            assert_eq!(kernel.reduce_add_scalar(&[]), 0);
            assert_eq!(kernel.reduce_add_vector(&[]).unwrap(), 0);
        }
    }

    #[test]
    fn test_single_stride_ones() {
        let data = [1; 16];
        for kernel in all_kernels() {
            assert_eq!(kernel.reduce_add_vector(&data).unwrap(), 16);
        }
    }

    #[test]
    fn test_multi_stride_iota() {
        let data: Vec<i32> = (0..32).collect();
        for kernel in all_kernels() {
            assert_eq!(kernel.reduce_add_vector(&data).unwrap(), 496);
            assert_eq!(kernel.reduce_add_scalar(&data), 496);
        }
    }

    #[test]
    fn test_negative_values_cancel() {
        let mut data = [0; 16];
        data[..4].copy_from_slice(&[-5, 3, -2, 4]);
        for kernel in all_kernels() {
            assert_eq!(kernel.reduce_add_vector(&data).unwrap(), 0);
            assert_eq!(kernel.reduce_add_scalar(&data), 0);
        }
    }

    #[test]
    fn test_misaligned_rejected() {
        let kernel = ReduceKernel::new();
        let data = [1; 17];
        assert_eq!(
            kernel.reduce_add_vector(&data),
            Err(ReduceError::MisalignedLength { len: 17, width: 16 })
        );
        // The scalar path takes any length
        assert_eq!(kernel.reduce_add_scalar(&data), 17);
    }

    #[test]
    fn test_reduce_add_picks_path() {
        let kernel = ReduceKernel::new();
        assert_eq!(kernel.reduce_add(&[1; 16]), 16);
        assert_eq!(kernel.reduce_add(&[1; 5]), 5);
    }

    #[test]
    fn test_unsupported_backend_rejected() {
        #[cfg(not(target_arch = "aarch64"))]
        assert_eq!(
            ReduceKernel::with_config(KernelConfig::new().with_backend(Backend::NEON)).err(),
            Some(ReduceError::UnsupportedBackend(Backend::NEON))
        );
    }

    #[test]
    fn test_vector_backend_never_scalar() {
        let kernel = ReduceKernel::with_config(KernelConfig::reference()).unwrap();
        assert_eq!(kernel.backend(), Backend::Scalar);
        assert_eq!(kernel.vector_backend(), Backend::Portable);
    }

    #[test]
    fn test_markers_bracket_each_call() {
        let counting = Arc::new(CountingMarkers::new());
        let kernel = ReduceKernel::new().with_shared_markers(counting.clone());

        kernel.reduce_add_scalar(&[1, 2, 3]);
        kernel.reduce_add_vector(&[0; 32]).unwrap();

        assert_eq!(counting.starts(), 2);
        assert_eq!(counting.ends(), 2);
    }

    #[test]
    fn test_no_markers_on_rejected_input() {
        let counting = Arc::new(CountingMarkers::new());
        let kernel = ReduceKernel::new().with_shared_markers(counting.clone());

        assert!(kernel.reduce_add_vector(&[0; 3]).is_err());
        assert_eq!(counting.starts(), 0);
    }

    #[test]
    fn test_internal_sums_are_unmarked() {
        let counting = Arc::new(CountingMarkers::new());
        let data: Vec<i32> = (0..48).collect();
        for kernel in all_kernels() {
            let kernel = kernel.with_shared_markers(counting.clone());
            assert_eq!(kernel.sum_lanes(&data), kernel.sum_scalar(&data));
            assert_eq!(kernel.sum_lanes(&data), 1128);
        }
        assert_eq!(counting.starts(), 0);
        assert_eq!(counting.ends(), 0);
    }

    #[test]
    fn test_free_functions() {
        let data: Vec<i32> = (0..64).collect();
        assert_eq!(reduce_add_scalar(&data), 2016);
        assert_eq!(reduce_add_vector(&data).unwrap(), 2016);
    }

    #[test]
    fn test_kernel_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReduceKernel>();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_vector_matches_scalar(
            strides in 0usize..16,
            seed in prop::collection::vec(any::<i32>(), 16 * 16)
        ) {
            let data = &seed[..strides * VECTOR_WIDTH];
            for kernel in all_kernels() {
                let scalar = kernel.reduce_add_scalar(data);
                let vector = kernel.reduce_add_vector(data).unwrap();
                prop_assert_eq!(scalar, vector);
            }
        }

        #[test]
        fn test_scalar_matches_wrapping_fold(data in prop::collection::vec(any::<i32>(), 0..200)) {
            let expected = data.iter().fold(0i32, |acc, &x| acc.wrapping_add(x));
            prop_assert_eq!(reduce_add_scalar(&data), expected);
        }
    }
}
