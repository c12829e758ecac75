//! State-change notification sink.
//!
//! The image never logs completion changes through a global facility;
//! instead the owning application injects an observer whose lifecycle it
//! controls. The default observer reports through `tracing`.

use crate::counter::WorkingCounterChange;

/// Receives rate-limited working-counter change notifications.
///
/// Called from [`crate::ProcessImage::process`] after the cycle lock is
/// released, at most once per notification interval.
pub trait StateObserver: Send + Sync {
    /// Deliver one batched change description for the given image.
    fn working_counter_changed(&self, image_index: u32, change: &WorkingCounterChange);
}

/// Default observer reporting changes as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StateObserver for LogObserver {
    fn working_counter_changed(&self, image_index: u32, change: &WorkingCounterChange) {
        if change.changes == 1 {
            tracing::info!(
                image = image_index,
                working_counter = change.working_counter,
                expected = change.expected_working_counter,
                "working counter changed"
            );
        } else {
            tracing::info!(
                image = image_index,
                changes = change.changes,
                working_counter = change.working_counter,
                expected = change.expected_working_counter,
                "working counter changed repeatedly"
            );
        }
    }
}
