//! The actor execution loop.

use tracing::info;

use crate::config::WorkloadConfig;
use crate::error::{ConfigError, TransportError};
use crate::metrics::RequestCounters;
use crate::phase::{Phase, ResolveOptions};

/// One independently scheduled execution of the phase/iteration loop.
///
/// Each instance runs on its own thread of control and issues requests
/// strictly sequentially: phases in declaration order, iterations in order
/// within a phase, one request in flight at a time. Instances share
/// nothing but the metrics family and their (read-only) base URL.
pub struct HttpActor {
    base_url: String,
    phases: Vec<Phase>,
    counters: RequestCounters,
}

impl HttpActor {
    /// Build one actor instance from a validated workload.
    ///
    /// `instance` perturbs the body-generator seed so concurrent instances
    /// do not replay identical request bodies.
    pub fn from_config(
        config: &WorkloadConfig,
        counters: RequestCounters,
        instance: u32,
    ) -> Result<Self, ConfigError> {
        let opts = ResolveOptions {
            timeout: config.timeout(),
            seed: config.seed.map(|seed| seed.wrapping_add(u64::from(instance))),
        };
        let phases = config
            .phases
            .iter()
            .enumerate()
            .map(|(index, decl)| Phase::resolve(index, decl, &opts))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            phases,
            counters,
        })
    }

    /// Drive every phase to completion.
    ///
    /// Each iteration opens an observation, resolves the endpoint, runs the
    /// phase's operation and marks the observation with the outcome. The
    /// first transport failure is recorded and then returned immediately:
    /// no retry, no further iterations, no further phases. Other actor
    /// instances are unaffected.
    pub fn run(mut self) -> Result<(), TransportError> {
        for phase in &mut self.phases {
            let config = match phase {
                Phase::Nop => continue,
                Phase::Active(config) => config,
            };
            info!("sending requests to {}{}", self.base_url, config.route);
            for _ in 0..config.repeat {
                let observation = self.counters.start();
                let endpoint = resolve_endpoint(&self.base_url, &config.route);
                match config.operation.run(&endpoint) {
                    Ok(()) => observation.success(),
                    Err(err) => {
                        observation.failure();
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolve the target endpoint for a phase. Deliberately plain
/// concatenation: the workload author controls both halves, and nothing is
/// normalized between them.
fn resolve_endpoint(base_url: &str, route: &str) -> String {
    format!("{base_url}{route}")
}
