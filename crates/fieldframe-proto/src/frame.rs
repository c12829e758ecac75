//! Frame windows and the redundant-path vocabulary.
//!
//! A frame window is one bounded-size unit of the process image, transmitted
//! once per cycle on each of two independent physical paths. The window's
//! kind and its expected acknowledgment contribution are derived from which
//! devices contribute regions to it, per direction.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::direction::Direction;
use crate::limits::MAX_FRAME_PAYLOAD;

/// One of the two redundant transmission paths for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Path {
    /// Primary network interface.
    Main = 0,
    /// Backup network interface.
    Backup = 1,
}

impl Path {
    /// Number of redundant paths.
    pub const COUNT: usize = 2;

    /// Both paths, in submission order.
    pub const ALL: [Self; Self::COUNT] = [Self::Main, Self::Backup];

    /// Lowercase name for labels and log events.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Backup => "backup",
        }
    }

    /// Array index of this path.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Operation kind of a frame window.
///
/// A window carrying both directions uses a combined read/write operation; a
/// single-direction window uses the cheaper pure read or pure write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    /// Logical read: input regions only.
    ReadOnly,
    /// Logical write: output regions only.
    WriteOnly,
    /// Combined logical read/write: both directions share the window.
    ReadWrite,
}

impl FrameKind {
    /// Short name for labels and log events.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read",
            Self::WriteOnly => "write",
            Self::ReadWrite => "read/write",
        }
    }
}

/// Window-local counters of distinct contributing devices per direction.
///
/// The packer counts each (device, direction) pair at most once per window,
/// so a device contributing several same-direction regions to one window
/// still increments the counter only once. These counts drive the frame-kind
/// selection and the expected acknowledgment value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionUsage {
    outputs: u16,
    inputs: u16,
}

impl DirectionUsage {
    /// Count one distinct device for the given direction.
    pub fn count(&mut self, direction: Direction) {
        match direction {
            Direction::Output => self.outputs += 1,
            Direction::Input => self.inputs += 1,
        }
    }

    /// Distinct devices with at least one output region in the window.
    pub const fn outputs(self) -> u16 {
        self.outputs
    }

    /// Distinct devices with at least one input region in the window.
    pub const fn inputs(self) -> u16 {
        self.inputs
    }

    /// Reset the counters for a fresh window.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Frame kind implied by the counted directions.
    pub const fn frame_kind(self) -> FrameKind {
        if self.outputs > 0 && self.inputs > 0 {
            FrameKind::ReadWrite
        } else if self.outputs > 0 {
            FrameKind::WriteOnly
        } else {
            FrameKind::ReadOnly
        }
    }

    /// Acknowledgment value a fully successful exchange yields per path.
    ///
    /// A combined read/write increments the hardware counter twice per
    /// contributing output device and once per contributing input device;
    /// pure writes and pure reads increment once per contributing device.
    pub const fn expected_working_counter(self) -> u16 {
        match self.frame_kind() {
            FrameKind::ReadWrite => 2 * self.outputs + self.inputs,
            FrameKind::WriteOnly => self.outputs,
            FrameKind::ReadOnly => self.inputs,
        }
    }
}

/// Descriptor of one packed frame window.
///
/// Shape is fixed at pack time; only the underlying buffer contents change
/// between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    /// Absolute logical address of the window's first byte.
    pub logical_address: u32,
    /// Payload size in bytes: the sum of the covered regions' sizes.
    pub size: usize,
    /// Operation kind derived from the window's direction usage.
    pub kind: FrameKind,
    /// Acknowledgment value a fully successful exchange yields per path.
    pub expected_working_counter: u16,
}

impl FrameWindow {
    /// Build a window descriptor from its address, size and direction usage.
    pub const fn from_usage(logical_address: u32, size: usize, usage: DirectionUsage) -> Self {
        Self {
            logical_address,
            size,
            kind: usage.frame_kind(),
            expected_working_counter: usage.expected_working_counter(),
        }
    }

    /// Whether this window exceeds [`MAX_FRAME_PAYLOAD`].
    ///
    /// Happens only when a single region is larger than the ceiling, in
    /// which case the region still gets a window of its own. The condition
    /// is reported, not rejected.
    pub const fn oversized(&self) -> bool {
        self.size > MAX_FRAME_PAYLOAD
    }
}
