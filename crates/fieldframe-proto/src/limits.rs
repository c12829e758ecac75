//! Platform payload limits.

/// Maximum process-data payload of a single frame window, in bytes.
///
/// A standard Ethernet frame carries at most 1500 payload bytes. The
/// fieldbus frame header (2 bytes), the telegram header (10 bytes) and the
/// trailing acknowledgment counter (2 bytes) leave 1486 bytes of addressable
/// process data per telegram.
///
/// A single region larger than this still gets a window of its own; such a
/// window exceeds the ceiling and is reported by
/// [`crate::FrameWindow::oversized`].
pub const MAX_FRAME_PAYLOAD: usize = 1486;
