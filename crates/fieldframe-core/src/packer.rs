//! Window packing over the ordered region sequence.
//!
//! A single pass walks the regions in registration order, accumulating a
//! running window and counting, per direction, the distinct devices that
//! contribute to it. A window closes when the next region's bytes would not
//! fit under the ceiling; its kind and expected acknowledgment follow from
//! the counts accumulated so far. The per-device bookkeeping lives in a
//! counted set local to this one pass, so packing leaves no trace on
//! long-lived device state.
//!
//! The overflow check runs before a region's usage is counted, so a
//! device's contribution is always attributed to the window that actually
//! carries its bytes.

use std::collections::HashSet;

use fieldframe_proto::{DeviceId, Direction, DirectionUsage, FrameWindow};

use crate::region::Region;

/// Partition regions into frame windows and assign absolute addresses.
///
/// Mutates each region's logical start address by adding `base_address`.
/// Returned windows are contiguous, non-overlapping, in region order, and
/// their sizes sum to the regions' total size. A window exceeds
/// `max_window` only when a single region does.
pub(crate) fn pack(
    regions: &mut [Region],
    base_address: u32,
    max_window: usize,
) -> Vec<FrameWindow> {
    let mut windows = Vec::new();
    let mut window_offset = 0usize;
    let mut window_size = 0usize;
    let mut usage = DirectionUsage::default();
    let mut counted: HashSet<(DeviceId, Direction)> = HashSet::new();

    for region in regions.iter_mut() {
        region.relocate(base_address);

        // Close the current window if this region's bytes would not fit.
        // An empty window is never emitted, so a region larger than the
        // ceiling still gets a window of its own.
        if window_size > 0 && window_size + region.size() > max_window {
            windows.push(FrameWindow::from_usage(
                base_address + window_offset as u32,
                window_size,
                usage,
            ));
            window_offset += window_size;
            window_size = 0;
            usage.clear();
            counted.clear();
        }

        if counted.insert((region.device(), region.direction())) {
            usage.count(region.direction());
        }

        window_size += region.size();
    }

    if window_size > 0 {
        windows.push(FrameWindow::from_usage(
            base_address + window_offset as u32,
            window_size,
            usage,
        ));
    }

    for window in &windows {
        if window.oversized() {
            tracing::warn!(
                logical_address = window.logical_address,
                size = window.size,
                "frame window exceeds the payload ceiling"
            );
        }
    }

    windows
}
