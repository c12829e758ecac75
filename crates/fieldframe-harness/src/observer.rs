//! Recording observer for notification assertions.

use std::sync::Arc;

use fieldframe_core::{StateObserver, WorkingCounterChange};
use parking_lot::Mutex;

/// Observer that records every delivered change notification.
///
/// Clones share the same recording, so a test can keep one handle while the
/// image owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    entries: Arc<Mutex<Vec<(u32, WorkingCounterChange)>>>,
}

impl RecordingObserver {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered change notifications, oldest first.
    pub fn changes(&self) -> Vec<WorkingCounterChange> {
        self.entries.lock().iter().map(|(_, change)| *change).collect()
    }

    /// Delivered notifications with the reporting image's index.
    pub fn entries(&self) -> Vec<(u32, WorkingCounterChange)> {
        self.entries.lock().clone()
    }
}

impl StateObserver for RecordingObserver {
    fn working_counter_changed(&self, image_index: u32, change: &WorkingCounterChange) {
        self.entries.lock().push((image_index, *change));
    }
}
