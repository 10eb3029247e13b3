//! Multi-instance orchestration.

use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::actor::HttpActor;
use crate::config::WorkloadConfig;
use crate::error::TransportError;
use crate::metrics::{RequestCounters, RequestTotals};

/// Outcome of one aborted actor instance.
#[derive(Debug)]
pub struct ActorFailure {
    pub instance: u32,
    pub error: TransportError,
}

/// Aggregate outcome of a workload run.
#[derive(Debug)]
pub struct RunOutcome {
    pub totals: RequestTotals,
    pub failures: Vec<ActorFailure>,
}

/// Spawns one thread per actor instance and waits for all of them.
pub struct WorkloadRunner {
    config: WorkloadConfig,
}

impl WorkloadRunner {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    /// Run the workload to completion.
    ///
    /// Instances are fully independent: a transport failure aborts only the
    /// instance it happened on, and iterations completed before the failure
    /// stay counted in the aggregate totals.
    pub fn run(&self) -> anyhow::Result<RunOutcome> {
        let counters = RequestCounters::new();
        let planned = self.planned_requests();

        let mut handles = Vec::with_capacity(self.config.actors as usize);
        for instance in 0..self.config.actors {
            let actor = HttpActor::from_config(&self.config, counters.clone(), instance)?;
            let handle = thread::Builder::new()
                .name(format!("actor-{instance}"))
                .spawn(move || actor.run())?;
            handles.push((instance, handle));
        }

        let progress = ProgressBar::new(planned);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} requests")
                .expect("invalid progress bar template")
                .progress_chars("##-"),
        );
        while handles.iter().any(|(_, handle)| !handle.is_finished()) {
            progress.set_position(counters.snapshot().total.min(planned));
            thread::sleep(Duration::from_millis(100));
        }
        progress.set_position(counters.snapshot().total.min(planned));
        progress.finish();

        let mut failures = Vec::new();
        for (instance, handle) in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(error)) => failures.push(ActorFailure { instance, error }),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        Ok(RunOutcome {
            totals: counters.snapshot(),
            failures,
        })
    }

    /// Upper bound on requests this run can issue, for the progress bar.
    fn planned_requests(&self) -> u64 {
        let per_instance: u64 = self
            .config
            .phases
            .iter()
            .filter(|decl| !decl.nop)
            .map(|decl| decl.repeat)
            .sum();
        per_instance * u64::from(self.config.actors)
    }
}
