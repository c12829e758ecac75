//! Simulated transport with scripted acknowledgments and seeded loss.

use std::collections::HashMap;

use bytes::Bytes;
use fieldframe_core::{OpStatus, OpToken, Submission, Transport};
use fieldframe_proto::{FrameKind, Path};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Record of one submitted frame operation.
#[derive(Debug, Clone)]
pub struct SubmittedFrame {
    /// Token identifying the operation.
    pub token: OpToken,
    /// Redundant path the frame was submitted on.
    pub path: Path,
    /// Absolute logical address of the frame window.
    pub logical_address: u32,
    /// Operation kind of the frame window.
    pub kind: FrameKind,
    /// Diagnostic label carried by the submission.
    pub label: String,
    /// Copy of the outgoing payload bytes at submission time.
    pub data: Bytes,
}

/// In-memory transport for deterministic tests.
///
/// Every submission is recorded and starts out unresolved. Tests resolve
/// operations explicitly; with a loss plan installed, each submission is
/// instead dropped with the configured probability, deterministically per
/// seed, and reported as timed out.
#[derive(Debug)]
pub struct SimTransport {
    next_token: u64,
    frames: Vec<SubmittedFrame>,
    resolutions: HashMap<u64, OpStatus>,
    loss: Option<LossPlan>,
}

#[derive(Debug)]
struct LossPlan {
    rate: f64,
    rng: ChaCha8Rng,
}

impl SimTransport {
    /// Transport where every submission stays pending until resolved.
    pub fn new() -> Self {
        Self { next_token: 0, frames: Vec::new(), resolutions: HashMap::new(), loss: None }
    }

    /// Transport dropping each submission with probability `rate`,
    /// reproducibly for a given `seed`.
    pub fn with_loss(rate: f64, seed: u64) -> Self {
        Self {
            loss: Some(LossPlan { rate, rng: ChaCha8Rng::seed_from_u64(seed) }),
            ..Self::new()
        }
    }

    /// All recorded submissions since the last clear, in submission order.
    pub fn submissions(&self) -> &[SubmittedFrame] {
        &self.frames
    }

    /// Forget recorded submissions; resolutions of their tokens remain.
    pub fn clear_submissions(&mut self) {
        self.frames.clear();
    }

    /// Resolve one operation with the given acknowledgment counter.
    pub fn complete(&mut self, token: OpToken, working_counter: u16) {
        self.resolutions.insert(token.raw(), OpStatus::Received { working_counter });
    }

    /// Mark one operation as timed out.
    pub fn time_out(&mut self, token: OpToken) {
        self.resolutions.insert(token.raw(), OpStatus::TimedOut);
    }

    /// Resolve every still-pending operation with the given counter.
    ///
    /// Operations dropped by the loss plan stay timed out.
    pub fn complete_all(&mut self, working_counter: u16) {
        for status in self.resolutions.values_mut() {
            if matches!(status, OpStatus::Pending) {
                *status = OpStatus::Received { working_counter };
            }
        }
    }

    /// Resolve every still-pending recorded operation on one path.
    pub fn complete_path(&mut self, path: Path, working_counter: u16) {
        let tokens: Vec<OpToken> = self
            .frames
            .iter()
            .filter(|frame| frame.path == path)
            .map(|frame| frame.token)
            .collect();
        for token in tokens {
            if matches!(self.status(token), OpStatus::Pending) {
                self.complete(token, working_counter);
            }
        }
    }
}

impl Default for SimTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SimTransport {
    fn submit(&mut self, submission: Submission<'_>) -> OpToken {
        let token = OpToken::new(self.next_token);
        self.next_token += 1;

        let lost = self
            .loss
            .as_mut()
            .is_some_and(|plan| plan.rng.gen_bool(plan.rate));
        let status = if lost { OpStatus::TimedOut } else { OpStatus::Pending };
        self.resolutions.insert(token.raw(), status);

        if lost {
            tracing::debug!(label = submission.label, "dropping submitted frame");
        }

        self.frames.push(SubmittedFrame {
            token,
            path: submission.path,
            logical_address: submission.logical_address,
            kind: submission.kind,
            label: submission.label.to_string(),
            data: Bytes::copy_from_slice(submission.data),
        });
        token
    }

    fn status(&self, token: OpToken) -> OpStatus {
        self.resolutions.get(&token.raw()).copied().unwrap_or(OpStatus::Pending)
    }
}
