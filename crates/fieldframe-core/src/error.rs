//! Error taxonomy for image configuration.

use std::collections::TryReserveError;

use fieldframe_proto::DeviceId;
use thiserror::Error;

/// Configuration-time failures of a process image.
///
/// Cycle-time anomalies are not errors: a path that returns no
/// acknowledgment contributes zero to the aggregate, and working-counter
/// mismatches surface through [`crate::StateObserver`] notifications and
/// [`crate::ImageState`] classification.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Allocating the image buffer, a backup buffer or the pair list failed.
    ///
    /// Fatal to the operation that hit it; no partially-constructed frame
    /// pair becomes visible.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// A region was registered with zero bytes.
    #[error("device {device:?} registered an empty region")]
    EmptyRegion {
        /// Device configuration that issued the request.
        device: DeviceId,
    },

    /// The image was finished twice. Packing must run exactly once.
    #[error("process image is already finished")]
    AlreadyFinished,

    /// The operation requires a finished image.
    #[error("process image is not finished yet")]
    NotFinished,

    /// The supplied external buffer cannot hold the process image.
    #[error("external buffer of {provided} bytes cannot hold a {required} byte image")]
    BufferTooSmall {
        /// Total size of the process image.
        required: usize,
        /// Length of the supplied buffer.
        provided: usize,
    },
}
