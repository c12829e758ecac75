//! Deterministic test infrastructure for the fieldframe process-data layer.
//!
//! An in-memory [`SimTransport`] records every frame submission and lets
//! tests script per-path resolutions, including seeded packet loss for
//! reproducible degraded-bus runs. [`CycleScenario`] builds an image, drives
//! scripted cycles over virtual time, and verifies the outcome through a
//! mandatory oracle.

pub mod observer;
pub mod scenario;
pub mod sim_transport;

pub use observer::RecordingObserver;
pub use scenario::{CycleScenario, CycleWorld, OracleFn, RunnableScenario};
pub use sim_transport::{SimTransport, SubmittedFrame};
