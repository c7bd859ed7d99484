//! Progress reporting
//!
//! Effects push fractional completion into a [`ProgressSink`] at a bounded
//! cadence. Consumers either subscribe (closure or channel) or poll a
//! [`SharedProgress`] handle. Only the latest value matters; intermediate
//! values may be skipped, but reported values never go backwards.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Pixel loops report at most once per this many pixels
pub const PIXEL_INTERVAL: usize = 10_000;

/// Block loops report at most once per this many blocks
pub const BLOCK_INTERVAL: usize = 10;

/// Snapshot of an in-flight operation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressState {
    /// Completion in [0, 1]
    pub fraction: f32,
    /// True while an `apply` call is running
    pub busy: bool,
}

/// Receiver of progress updates
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f32);
}

impl<F> ProgressSink for F
where
    F: Fn(f32) + Send + Sync,
{
    fn report(&self, fraction: f32) {
        self(fraction);
    }
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f32) {}
}

/// Forwards updates into an mpsc channel.
/// A dropped receiver is not an error; updates are simply lost.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<f32>,
}

impl ChannelSink {
    pub fn new(sender: Sender<f32>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, fraction: f32) {
        let _ = self.sender.send(fraction);
    }
}

// ============================================================================
// Shared observable state
// ============================================================================

#[derive(Debug, Default)]
struct Shared {
    fraction_bits: AtomicU32,
    busy: AtomicBool,
}

/// Cloneable handle to a progress scalar and busy flag.
/// Writers overwrite; readers see the latest value.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    inner: Arc<Shared>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressState {
        ProgressState {
            fraction: self.fraction(),
            busy: self.is_busy(),
        }
    }

    pub fn fraction(&self) -> f32 {
        f32::from_bits(self.inner.fraction_bits.load(Ordering::Acquire))
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Mark an operation as started (busy, 0.0)
    pub(crate) fn begin(&self) {
        self.store(0.0);
        self.inner.busy.store(true, Ordering::Release);
    }

    /// Mark an operation as finished (idle, 1.0)
    pub(crate) fn finish(&self) {
        self.store(1.0);
        self.inner.busy.store(false, Ordering::Release);
    }

    fn store(&self, fraction: f32) {
        self.inner
            .fraction_bits
            .store(fraction.to_bits(), Ordering::Release);
    }
}

impl ProgressSink for SharedProgress {
    fn report(&self, fraction: f32) {
        self.store(fraction);
    }
}

// ============================================================================
// Progress (engine side)
// ============================================================================

/// Engine-side reporter: clamps to [0, 1] and drops values that would move
/// backwards, so sinks only ever see a monotonic sequence.
pub struct Progress<'a> {
    sink: &'a dyn ProgressSink,
    last: f32,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0.0 }
    }

    /// A reporter that goes nowhere
    pub fn silent() -> Progress<'static> {
        Progress::new(&NoProgress)
    }

    /// Report the start of work (exactly 0.0)
    pub fn start(&mut self) {
        self.last = 0.0;
        self.sink.report(0.0);
    }

    /// Report `fraction` if it advances past the last reported value
    pub fn update(&mut self, fraction: f32) {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > self.last {
            self.last = fraction;
            self.sink.report(fraction);
        }
    }

    /// Report `done / total` when `done` falls on an `interval` boundary
    #[inline]
    pub fn tick(&mut self, done: usize, total: usize, interval: usize) {
        if total > 0 && interval > 0 && done % interval == 0 {
            self.update(done as f32 / total as f32);
        }
    }

    /// Report completion (exactly 1.0)
    pub fn finish(&mut self) {
        self.last = 1.0;
        self.sink.report(1.0);
    }
}
