//! Process image domain orchestration.

use std::time::Instant;

use fieldframe_proto::{DeviceId, Direction, FrameWindow, MAX_FRAME_PAYLOAD, RegionRequest};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::counter::{ImageState, NotifyPolicy, WorkingCounterTracker};
use crate::error::ImageError;
use crate::observer::{LogObserver, StateObserver};
use crate::packer;
use crate::pair::FramePair;
use crate::region::Region;
use crate::transport::Transport;

/// Backing storage of the process image.
///
/// At most one mode is active at a time; switching to external mode drops
/// any internally allocated buffer.
#[derive(Debug)]
enum ImageBuffer {
    /// Allocated by `finish`; empty until then.
    Internal(Vec<u8>),
    /// Supplied by the application, which allocated it.
    External(Box<[u8]>),
}

impl ImageBuffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Self::Internal(buf) => buf.as_slice(),
            Self::External(buf) => buf,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Internal(buf) => buf.as_mut_slice(),
            Self::External(buf) => buf,
        }
    }
}

/// Cycle-time state guarded by the image lock.
///
/// The lock serializes buffer-pointer replacement from a control path
/// against the cyclic task's `queue`/`process`, so a swap can never free or
/// tear memory referenced by an in-flight submission.
#[derive(Debug)]
struct Inner {
    buffer: ImageBuffer,
    pairs: Vec<FramePair>,
    tracker: WorkingCounterTracker,
}

/// The process image: a flat logical address space exchanged every cycle.
///
/// Regions are registered at configuration time, packed exactly once by
/// [`finish`](Self::finish) into redundant frame pairs, then driven by the
/// cyclic task: [`queue`](Self::queue) submits every pair on both paths,
/// and one cycle later [`process`](Self::process) aggregates the
/// acknowledgment counters.
pub struct ProcessImage {
    index: u32,
    regions: Vec<Region>,
    data_size: usize,
    logical_base_address: u32,
    finished: bool,
    inner: Mutex<Inner>,
    observer: Box<dyn StateObserver>,
}

impl std::fmt::Debug for ProcessImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessImage")
            .field("index", &self.index)
            .field("regions", &self.regions.len())
            .field("data_size", &self.data_size)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl ProcessImage {
    /// Create an empty image with the default notification policy.
    pub fn new(index: u32) -> Self {
        Self::with_policy(index, NotifyPolicy::default())
    }

    /// Create an empty image with an explicit notification policy.
    pub fn with_policy(index: u32, policy: NotifyPolicy) -> Self {
        Self {
            index,
            regions: Vec::new(),
            data_size: 0,
            logical_base_address: 0,
            finished: false,
            inner: Mutex::new(Inner {
                buffer: ImageBuffer::Internal(Vec::new()),
                pairs: Vec::new(),
                tracker: WorkingCounterTracker::new(policy),
            }),
            observer: Box::new(LogObserver),
        }
    }

    /// Index of this image, carried in frame labels and log events.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Replace the injected state-change observer.
    pub fn set_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observer = observer;
    }

    /// Append one region and return its assigned byte offset in the image.
    pub fn add_region(
        &mut self,
        device: DeviceId,
        direction: Direction,
        size: usize,
    ) -> Result<usize, ImageError> {
        if self.finished {
            return Err(ImageError::AlreadyFinished);
        }
        if size == 0 {
            return Err(ImageError::EmptyRegion { device });
        }

        let offset = self.data_size;
        self.regions.push(Region::new(device, direction, size, offset as u32));
        self.data_size += size;

        tracing::debug!(
            image = self.index,
            device = device.0,
            direction = direction.as_str(),
            added = size,
            total = self.data_size,
            "region registered"
        );
        Ok(offset)
    }

    /// Register a batch of regions, answering each request with its byte
    /// offset inside the image.
    ///
    /// Requests are validated up front; on error nothing is registered.
    pub fn register_regions(
        &mut self,
        requests: &[RegionRequest],
    ) -> Result<Vec<usize>, ImageError> {
        if self.finished {
            return Err(ImageError::AlreadyFinished);
        }
        if let Some(empty) = requests.iter().find(|request| request.size == 0) {
            return Err(ImageError::EmptyRegion { device: empty.device });
        }

        requests
            .iter()
            .map(|request| self.add_region(request.device, request.direction, request.size))
            .collect()
    }

    /// Pack the registered regions into frame pairs.
    ///
    /// Assigns the logical base address, allocates the internal buffer when
    /// no external one is installed, and builds every frame pair under the
    /// fixed payload ceiling. Must be called exactly once, after all
    /// registrations and before the first cycle. On allocation failure the
    /// image keeps its pre-call state and no frame pair becomes visible.
    pub fn finish(&mut self, base_address: u32) -> Result<(), ImageError> {
        if self.finished {
            return Err(ImageError::AlreadyFinished);
        }

        let inner = self.inner.get_mut();

        if self.data_size > 0
            && let ImageBuffer::Internal(buf) = &mut inner.buffer
        {
            buf.try_reserve_exact(self.data_size)?;
            buf.resize(self.data_size, 0);
        }

        let windows = packer::pack(&mut self.regions, base_address, MAX_FRAME_PAYLOAD);

        let mut pairs = Vec::new();
        pairs.try_reserve_exact(windows.len())?;
        let mut offset = 0usize;
        for window in windows {
            let pair = FramePair::allocate(self.index, window, offset)?;
            offset += pair.window().size;
            pairs.push(pair);
        }

        let expected = pairs
            .iter()
            .map(|pair| pair.window().expected_working_counter)
            .fold(0u16, u16::wrapping_add);

        inner.tracker.set_expected(expected);
        inner.pairs = pairs;
        self.logical_base_address = base_address;
        self.finished = true;

        tracing::info!(
            image = self.index,
            logical_base_address = base_address,
            size = self.data_size,
            expected_working_counter = expected,
            "process image finished"
        );
        for pair in &inner.pairs {
            tracing::debug!(
                frame = pair.label(fieldframe_proto::Path::Main),
                logical_address = pair.window().logical_address,
                size = pair.window().size,
                kind = pair.window().kind.as_str(),
                "frame window"
            );
        }

        Ok(())
    }

    /// Total byte size of the process image.
    pub const fn size(&self) -> usize {
        self.data_size
    }

    /// Number of registered regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Region at the given registration position.
    pub fn region(&self, pos: usize) -> Option<&Region> {
        self.regions.get(pos)
    }

    /// Logical base address assigned by `finish`.
    pub const fn logical_base_address(&self) -> u32 {
        self.logical_base_address
    }

    /// Whether `finish` has run.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Expected working counter representing full success.
    pub fn expected_working_counter(&self) -> u16 {
        self.inner.lock().tracker.expected()
    }

    /// Shape descriptors of the packed frame windows, in transmission order.
    pub fn windows(&self) -> Vec<FrameWindow> {
        self.inner.lock().pairs.iter().map(|pair| *pair.window()).collect()
    }

    /// Install an externally allocated buffer as the image storage.
    ///
    /// The previously installed external buffer, if any, is handed back;
    /// an internal buffer is dropped. The swap holds the cycle lock for its
    /// whole duration, so it cannot interleave with `queue`, `process` or
    /// `data` on another thread.
    pub fn external_memory(&self, memory: Box<[u8]>) -> Result<Option<Box<[u8]>>, ImageError> {
        if !self.finished {
            return Err(ImageError::NotFinished);
        }
        if memory.len() < self.data_size {
            return Err(ImageError::BufferTooSmall {
                required: self.data_size,
                provided: memory.len(),
            });
        }

        let mut inner = self.inner.lock();
        let previous = std::mem::replace(&mut inner.buffer, ImageBuffer::External(memory));
        match previous {
            ImageBuffer::External(buf) => Ok(Some(buf)),
            ImageBuffer::Internal(_) => Ok(None),
        }
    }

    /// Lock-guarded access to the process values.
    ///
    /// The application reads inputs and writes outputs through this guard
    /// between `process` and the next `queue`. Holding the guard blocks a
    /// concurrent buffer swap and the cyclic operations.
    pub fn data(&self) -> MappedMutexGuard<'_, [u8]> {
        MutexGuard::map(self.inner.lock(), |inner| inner.buffer.as_mut_slice())
    }

    /// Submit every frame pair for transmission, in packing order.
    ///
    /// For each pair the primary window bytes are mirrored into the backup
    /// buffer, then both paths are handed to the transport. Non-blocking: a
    /// pure submission handoff.
    pub fn queue<T: Transport>(&self, transport: &mut T) {
        let mut guard = self.inner.lock();
        let Inner { buffer, pairs, .. } = &mut *guard;
        let data = buffer.as_slice();

        for pair in pairs.iter_mut() {
            let start = pair.image_offset();
            let primary = &data[start..start + pair.window().size];
            pair.queue(primary, transport);
        }
    }

    /// Aggregate the acknowledgments of the last queued cycle.
    ///
    /// Sums the resolved acknowledgment values over every pair and path
    /// (an unresolved path contributes zero), records the sum, and, when
    /// the rate limit allows, delivers one batched change notification to
    /// the observer after releasing the cycle lock.
    pub fn process<T: Transport>(&self, transport: &T, now: Instant) {
        let change = {
            let mut inner = self.inner.lock();

            let mut sum = 0u16;
            for pair in &inner.pairs {
                for ack in pair.collect(transport).into_iter().flatten() {
                    sum = sum.wrapping_add(ack);
                }
            }

            inner.tracker.record(sum);
            inner.tracker.poll_notify(now)
        };

        if let Some(change) = change {
            self.observer.working_counter_changed(self.index, &change);
        }
    }

    /// Aggregate state of the last processed cycle and its classification.
    pub fn state(&self) -> ImageState {
        self.inner.lock().tracker.state()
    }
}
