//! Start/end instrumentation markers
//!
//! Every kernel call emits exactly one start marker before touching the input
//! and one end marker after the output is written. Markers carry no payload and
//! cannot influence the result; they exist so external profiling tools can
//! bracket the computation.
//!
//! The sink is injected through [`EventMarkers`], keeping the kernel independent
//! of any tracing backend.
//!
//! # Examples
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use tile_reduce::markers::{CallbackMarkers, MarkerGuard};
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let (s, e) = (calls.clone(), calls.clone());
//! let markers = CallbackMarkers::new(
//!     move || { s.fetch_add(1, Ordering::SeqCst); },
//!     move || { e.fetch_add(10, Ordering::SeqCst); },
//! );
//!
//! {
//!     let _guard = MarkerGuard::new(&markers);
//! }
//! assert_eq!(calls.load(Ordering::SeqCst), 11);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for the paired start/end markers
pub trait EventMarkers: Send + Sync {
    /// Emitted before the computation starts
    fn start(&self);

    /// Emitted after the output has been written
    fn end(&self);
}

impl<M: EventMarkers + ?Sized> EventMarkers for &M {
    fn start(&self) {
        (**self).start();
    }

    fn end(&self) {
        (**self).end();
    }
}

/// Scoped marker pair: `start` on creation, `end` on drop
///
/// The end marker fires on every exit path, including unwinding.
#[must_use = "dropping the guard immediately emits the end marker"]
pub struct MarkerGuard<'a, M: EventMarkers + ?Sized> {
    markers: &'a M,
}

impl<'a, M: EventMarkers + ?Sized> MarkerGuard<'a, M> {
    /// Emit the start marker and return the guard
    pub fn new(markers: &'a M) -> Self {
        markers.start();
        Self { markers }
    }
}

impl<M: EventMarkers + ?Sized> Drop for MarkerGuard<'_, M> {
    fn drop(&mut self) {
        self.markers.end();
    }
}

/// Markers that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMarkers;

impl EventMarkers for NoopMarkers {
    #[inline(always)]
    fn start(&self) {}

    #[inline(always)]
    fn end(&self) {}
}

/// Markers forwarded to `tracing` as `event0`/`event1` trace events
///
/// Events are emitted under target `tile_reduce::markers` inside whatever span
/// is current, so the kernel operation span identifies the entry point. Without
/// the `tracing` feature this sink is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMarkers;

impl EventMarkers for TracingMarkers {
    #[inline]
    fn start(&self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "tile_reduce::markers", "event0");
    }

    #[inline]
    fn end(&self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "tile_reduce::markers", "event1");
    }
}

/// Markers backed by a pair of no-argument callbacks
pub struct CallbackMarkers<S, E> {
    on_start: S,
    on_end: E,
}

impl<S, E> CallbackMarkers<S, E>
where
    S: Fn() + Send + Sync,
    E: Fn() + Send + Sync,
{
    /// Create markers from start and end callbacks
    pub fn new(on_start: S, on_end: E) -> Self {
        Self { on_start, on_end }
    }
}

impl<S, E> EventMarkers for CallbackMarkers<S, E>
where
    S: Fn() + Send + Sync,
    E: Fn() + Send + Sync,
{
    fn start(&self) {
        (self.on_start)();
    }

    fn end(&self) {
        (self.on_end)();
    }
}

impl<S, E> std::fmt::Debug for CallbackMarkers<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackMarkers").finish_non_exhaustive()
    }
}

/// Markers that count how many starts and ends were emitted
///
/// Handy for asserting the start/end pairing from tests or a profiling harness.
#[derive(Debug, Default)]
pub struct CountingMarkers {
    starts: AtomicU64,
    ends: AtomicU64,
}

impl CountingMarkers {
    /// Create counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of start markers seen
    pub fn starts(&self) -> u64 {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of end markers seen
    pub fn ends(&self) -> u64 {
        self.ends.load(Ordering::Relaxed)
    }
}

impl EventMarkers for CountingMarkers {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::Relaxed);
    }

    fn end(&self) {
        self.ends.fetch_add(1, Ordering::Relaxed);
    }
}
