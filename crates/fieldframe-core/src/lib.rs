//! Fieldframe process-data core
//!
//! Packing, redundancy and completion tracking for the process image of a
//! real-time fieldbus master, completely decoupled from the physical
//! transport.
//!
//! # Architecture
//!
//! The core is deterministic logic isolated from I/O, time and scheduling.
//! All external effects are supplied explicitly by the caller: frames are
//! handed to a [`Transport`] implementation as non-blocking submissions, and
//! cycle processing reads back already-resolved results with the current
//! time passed in as a parameter.
//!
//! At configuration time the image's regions are packed once into
//! minimally-many frame windows under a fixed payload ceiling, each realized
//! as a [`FramePair`] that replicates the window over a main and a backup
//! path. At cycle time [`ProcessImage::queue`] mirrors the primary bytes
//! into every backup buffer and submits both paths;
//! [`ProcessImage::process`] aggregates the per-path acknowledgment
//! counters, classifies completion, and reports rate-limited state changes
//! through an injected [`StateObserver`].
//!
//! # Components
//!
//! - [`region`]: contiguous per-device spans of the process image
//! - [`image`]: the [`ProcessImage`] domain orchestrating packing and cycles
//! - [`pair`]: redundant main/backup frame pairs
//! - [`counter`]: working-counter aggregation and change batching
//! - [`observer`]: injected state-change notification sink
//! - [`transport`]: the frame submission seam

pub mod counter;
pub mod error;
pub mod image;
pub mod observer;
mod packer;
pub mod pair;
pub mod region;
pub mod transport;

pub use counter::{ImageState, NotifyPolicy, WcState, WorkingCounterChange, WorkingCounterTracker};
pub use error::ImageError;
pub use image::ProcessImage;
pub use observer::{LogObserver, StateObserver};
pub use pair::FramePair;
pub use region::Region;
pub use transport::{OpStatus, OpToken, Submission, Transport};
