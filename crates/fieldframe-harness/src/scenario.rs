//! Cycle scenario builder with mandatory oracle verification.
//!
//! A scenario declares an image layout and a script of cycles, runs them
//! over virtual time against a [`SimTransport`], and hands the resulting
//! world to an oracle for verification. The oracle is mandatory; a scenario
//! without one cannot run.

use std::time::{Duration, Instant};

use fieldframe_core::{NotifyPolicy, ProcessImage, WorkingCounterChange};
use fieldframe_proto::{DeviceId, Direction, Path, RegionRequest};

use crate::observer::RecordingObserver;
use crate::sim_transport::SimTransport;

/// Verification function run against the final world state.
pub type OracleFn = Box<dyn Fn(&CycleWorld) -> Result<(), String>>;

/// One scripted cycle of a scenario.
#[derive(Debug, Clone, Copy)]
enum CycleStep {
    /// Every window is fully acknowledged on the main path.
    Healthy,
    /// No path returns anything.
    Silent,
}

/// Declarative builder for cycle scenarios.
pub struct CycleScenario {
    name: String,
    regions: Vec<RegionRequest>,
    base_address: u32,
    policy: NotifyPolicy,
    loss: Option<(f64, u64)>,
    cycle_period: Duration,
    steps: Vec<CycleStep>,
}

impl CycleScenario {
    /// Start a scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regions: Vec::new(),
            base_address: 0,
            policy: NotifyPolicy::default(),
            loss: None,
            cycle_period: Duration::from_millis(1),
            steps: Vec::new(),
        }
    }

    /// Add one region to the image layout.
    pub fn region(mut self, device: u16, direction: Direction, size: usize) -> Self {
        self.regions.push(RegionRequest { device: DeviceId(device), direction, size });
        self
    }

    /// Logical base address handed to `finish`.
    pub fn base_address(mut self, base_address: u32) -> Self {
        self.base_address = base_address;
        self
    }

    /// Notification rate limit of the image under test.
    pub fn notify_policy(mut self, policy: NotifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Virtual time advanced per cycle.
    pub fn cycle_period(mut self, period: Duration) -> Self {
        self.cycle_period = period;
        self
    }

    /// Drop each submission with the given probability, seeded.
    pub fn loss(mut self, rate: f64, seed: u64) -> Self {
        self.loss = Some((rate, seed));
        self
    }

    /// Script one cycle where every window is fully acknowledged.
    pub fn healthy_cycle(mut self) -> Self {
        self.steps.push(CycleStep::Healthy);
        self
    }

    /// Script one cycle where no path answers.
    pub fn silent_cycle(mut self) -> Self {
        self.steps.push(CycleStep::Silent);
        self
    }

    /// Set the oracle and return a runnable scenario.
    ///
    /// The oracle is mandatory: verification is part of the scenario, not
    /// an afterthought.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle, ready to execute.
pub struct RunnableScenario {
    scenario: CycleScenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Build the image, run the scripted cycles, verify with the oracle.
    pub fn run(self) -> Result<(), String> {
        let name = &self.scenario.name;

        let mut image = ProcessImage::with_policy(0, self.scenario.policy.clone());
        let observer = RecordingObserver::new();
        image.set_observer(Box::new(observer.clone()));

        image
            .register_regions(&self.scenario.regions)
            .map_err(|e| format!("scenario '{name}': registration failed: {e}"))?;
        image
            .finish(self.scenario.base_address)
            .map_err(|e| format!("scenario '{name}': finish failed: {e}"))?;

        let transport = match self.scenario.loss {
            Some((rate, seed)) => SimTransport::with_loss(rate, seed),
            None => SimTransport::new(),
        };

        let mut world = CycleWorld {
            image,
            transport,
            observer,
            now: Instant::now(),
            cycle_period: self.scenario.cycle_period,
        };

        for step in &self.scenario.steps {
            match step {
                CycleStep::Healthy => world.run_healthy_cycle(),
                CycleStep::Silent => world.run_silent_cycle(),
            }
        }

        (self.oracle)(&world)
    }
}

/// World state a scenario's oracle inspects.
pub struct CycleWorld {
    image: ProcessImage,
    transport: SimTransport,
    observer: RecordingObserver,
    now: Instant,
    cycle_period: Duration,
}

impl CycleWorld {
    /// The image under test.
    pub fn image(&self) -> &ProcessImage {
        &self.image
    }

    /// The simulated transport.
    pub fn transport(&self) -> &SimTransport {
        &self.transport
    }

    /// Change notifications delivered so far, oldest first.
    pub fn notifications(&self) -> Vec<WorkingCounterChange> {
        self.observer.changes()
    }

    /// Current virtual time.
    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Run one cycle, resolving submissions with the given closure between
    /// queue and process.
    pub fn run_cycle_with(&mut self, resolve: impl FnOnce(&mut SimTransport)) {
        self.transport.clear_submissions();
        self.image.queue(&mut self.transport);
        resolve(&mut self.transport);
        self.now += self.cycle_period;
        self.image.process(&self.transport, self.now);
    }

    /// Run one cycle where every window is fully acknowledged on the main
    /// path and the backup path stays silent, as on a healthy bus.
    pub fn run_healthy_cycle(&mut self) {
        let windows = self.image.windows();
        self.run_cycle_with(|transport| {
            let main_tokens: Vec<_> = transport
                .submissions()
                .iter()
                .filter(|frame| frame.path == Path::Main)
                .map(|frame| frame.token)
                .collect();
            for (token, window) in main_tokens.into_iter().zip(&windows) {
                transport.complete(token, window.expected_working_counter);
            }
        });
    }

    /// Run one cycle where nothing answers on either path.
    pub fn run_silent_cycle(&mut self) {
        self.run_cycle_with(|_| {});
    }
}
