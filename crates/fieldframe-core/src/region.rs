//! Contiguous per-device spans of the process image.

use fieldframe_proto::{DeviceId, Direction};

/// A contiguous span of the process image belonging to one device.
///
/// Regions are created by registration in insertion order, which is also
/// packing order. The logical start address is image-relative until
/// [`crate::ProcessImage::finish`] assigns the base address, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    device: DeviceId,
    direction: Direction,
    size: usize,
    logical_start: u32,
}

impl Region {
    pub(crate) const fn new(
        device: DeviceId,
        direction: Direction,
        size: usize,
        logical_start: u32,
    ) -> Self {
        Self { device, direction, size, logical_start }
    }

    /// Owning device configuration.
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    /// Transfer direction of this span.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Span size in bytes. Always non-zero.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Logical start address; absolute once the image is finished.
    pub const fn logical_start(&self) -> u32 {
        self.logical_start
    }

    /// Shift the image-relative start address by the logical base.
    pub(crate) fn relocate(&mut self, base_address: u32) {
        self.logical_start += base_address;
    }
}
