//! Progress hooks for reconciliation passes.
//!
//! The engine counts one unit per reconciled place and names the state it
//! is working on; how that is drawn is up to the caller.

use std::sync::Arc;

/// Receives progress from a [`Reconciler`](crate::Reconciler).
///
/// State partitions run on separate threads and share one callback, hence
/// `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Number of places the pass will reconcile.
    fn set_total(&self, total: u64);

    /// `delta` more places are done.
    fn inc(&self, delta: u64);

    /// Describes the partition currently being reconciled.
    fn set_message(&self, msg: String);

    /// The pass is over.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Default callback for a [`Reconciler`](crate::Reconciler) built without
/// one.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
