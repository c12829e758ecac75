//! Redundant main/backup frame pairs.

use fieldframe_proto::{FrameWindow, Path};

use crate::error::ImageError;
use crate::transport::{OpStatus, OpToken, Submission, Transport};

/// One frame window replicated across the main and the backup path.
///
/// The main path transmits the image buffer's bytes directly, zero-copy.
/// The backup buffer is always exclusively owned and sized to the window;
/// at queue time it is overwritten with the primary bytes so the backup
/// path carries the same outgoing data. Pairs are created by
/// [`crate::ProcessImage::finish`] and fixed in shape thereafter.
#[derive(Debug)]
pub struct FramePair {
    window: FrameWindow,
    image_offset: usize,
    backup: Vec<u8>,
    labels: [String; Path::COUNT],
    tokens: [Option<OpToken>; Path::COUNT],
}

impl FramePair {
    /// Allocate a pair for the given window.
    ///
    /// The backup buffer allocation is fallible; on failure nothing of the
    /// pair exists and the caller sees only the error.
    pub(crate) fn allocate(
        image_index: u32,
        window: FrameWindow,
        image_offset: usize,
    ) -> Result<Self, ImageError> {
        let mut backup = Vec::new();
        backup.try_reserve_exact(window.size)?;
        backup.resize(window.size, 0);

        let labels = Path::ALL
            .map(|path| format!("image{image_index}-{}-{}", window.logical_address, path.as_str()));

        Ok(Self { window, image_offset, backup, labels, tokens: [None; Path::COUNT] })
    }

    /// Shape descriptor of this pair's window.
    pub const fn window(&self) -> &FrameWindow {
        &self.window
    }

    /// Image-relative byte offset of the window's primary bytes.
    pub const fn image_offset(&self) -> usize {
        self.image_offset
    }

    /// Diagnostic label of the given path's frame.
    pub fn label(&self, path: Path) -> &str {
        &self.labels[path.index()]
    }

    /// Mirror the primary bytes into the backup buffer and submit both
    /// paths as separate transport operations.
    ///
    /// `primary` is the window's slice of the image buffer; its length
    /// equals the window size by construction.
    pub(crate) fn queue<T: Transport>(&mut self, primary: &[u8], transport: &mut T) {
        self.backup.copy_from_slice(primary);

        for path in Path::ALL {
            let data = match path {
                Path::Main => primary,
                Path::Backup => self.backup.as_slice(),
            };
            let token = transport.submit(Submission {
                path,
                logical_address: self.window.logical_address,
                kind: self.window.kind,
                label: &self.labels[path.index()],
                data,
            });
            self.tokens[path.index()] = Some(token);
        }
    }

    /// Read the per-path acknowledgment values of the last queued cycle.
    ///
    /// A path whose operation is unresolved or timed out yields `None`,
    /// contributing zero to the aggregate. A pair that was never queued
    /// yields `None` on both paths.
    pub(crate) fn collect<T: Transport>(&self, transport: &T) -> [Option<u16>; Path::COUNT] {
        Path::ALL.map(|path| {
            self.tokens[path.index()].and_then(|token| match transport.status(token) {
                OpStatus::Received { working_counter } => Some(working_counter),
                OpStatus::Pending | OpStatus::TimedOut => None,
            })
        })
    }
}
