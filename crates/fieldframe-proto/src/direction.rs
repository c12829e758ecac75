//! Direction and device identity vocabulary.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Transfer direction of a process-data region, relative to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Direction {
    /// Values produced by a device and read into the image.
    Input = 0,
    /// Values written from the image out to a device.
    Output = 1,
}

impl Direction {
    /// Lowercase name for labels and log events.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Opaque identity of the device configuration that owns a region.
///
/// The region-discovery collaborator assigns these; the packing layer only
/// compares them to avoid counting one device twice per direction within a
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(
    /// Raw identifier assigned by the configuration layer.
    pub u16,
);

/// A request to reserve process-data space for one device region.
///
/// Produced by the region-discovery collaborator and consumed by
/// registration, which answers with the assigned byte offset inside the
/// image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRequest {
    /// Owning device configuration.
    pub device: DeviceId,
    /// Transfer direction of the requested span.
    pub direction: Direction,
    /// Requested size in bytes. Must be non-zero.
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_names() {
        assert_eq!(Direction::Input.as_str(), "input");
        assert_eq!(Direction::Output.as_str(), "output");
    }

    #[test]
    fn device_id_ordering_is_by_raw_value() {
        assert!(DeviceId(1) < DeviceId(2));
        assert_eq!(DeviceId(7), DeviceId(7));
    }
}
