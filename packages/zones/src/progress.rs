//! Progress reporting for resolution passes.
//!
//! Defines a [`ProgressCallback`] trait that decouples progress reporting
//! from any specific rendering backend. The CLI renders it with
//! `indicatif`; the server passes [`NullProgress`].

/// Trait for reporting progress from a resolution pass.
///
/// Implementations must be `Send + Sync` since geocoding futures complete
/// in arbitrary order and each reports independently.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected number of records (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` records.
    fn inc(&self, delta: u64);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark progress as complete and remove the progress indicator.
    fn finish_and_clear(&self);
}

/// A no-op implementation of [`ProgressCallback`].
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

