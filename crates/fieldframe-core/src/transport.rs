//! Transport seam for frame submission.
//!
//! The physical layer that frames actually traverse is an external
//! collaborator. The core only needs two things from it: a non-blocking
//! handoff of outgoing frame buffers, and a synchronous read of each
//! operation's resolution when the cycle is processed. The transport may
//! fill in results from interrupts or other threads between the two calls;
//! the core never waits on it.

use fieldframe_proto::{FrameKind, Path};

/// Handle to one submitted transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpToken(u64);

impl OpToken {
    /// Wrap a transport-chosen raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier chosen by the transport.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Resolution of a submitted operation, read at process time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    /// Not resolved yet; contributes nothing this cycle.
    Pending,
    /// The cycle budget elapsed without a response on this path.
    ///
    /// A normal condition on a lossy or degraded path, not an error.
    TimedOut,
    /// A response arrived carrying the hardware acknowledgment counter.
    Received {
        /// Acknowledgment counter summed over the devices that responded.
        working_counter: u16,
    },
}

/// One frame buffer handed to the transport for transmission.
///
/// The data slice borrows the frame's buffer for the duration of the call;
/// a transport that needs the bytes later must copy them.
#[derive(Debug)]
pub struct Submission<'a> {
    /// Which redundant path this operation travels.
    pub path: Path,
    /// Absolute logical address of the frame window.
    pub logical_address: u32,
    /// Operation kind of the frame window.
    pub kind: FrameKind,
    /// Human-readable frame label for diagnostics.
    pub label: &'a str,
    /// Outgoing payload bytes.
    pub data: &'a [u8],
}

/// Abstract transmit backend for redundant frame pairs.
pub trait Transport {
    /// Accept one frame for transmission. Never blocks.
    ///
    /// The returned token identifies the operation for a later
    /// [`status`](Self::status) query. Transmission failures surface as
    /// [`OpStatus::TimedOut`] on that query, never here.
    fn submit(&mut self, submission: Submission<'_>) -> OpToken;

    /// Read the current resolution of a previously submitted operation.
    fn status(&self, token: OpToken) -> OpStatus;
}
