//! Request outcome instrumentation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use hdrhistogram::Histogram;
use serde::Serialize;

/// The "Requests" counter family for one workload run.
///
/// Cloning yields another handle to the same family, so every actor
/// instance of a run feeds one aggregate. Counts accumulated before an
/// instance aborts stay visible.
#[derive(Clone)]
pub struct RequestCounters {
    inner: Arc<Mutex<CounterState>>,
}

struct CounterState {
    latency_us: Histogram<u64>,
    successes: u64,
    failures: u64,
    first_request: Option<Instant>,
    last_request: Option<Instant>,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CounterState {
                latency_us: Histogram::new(3).expect("failed to create histogram"),
                successes: 0,
                failures: 0,
                first_request: None,
                last_request: None,
            })),
        }
    }

    /// Open a fresh observation. Exactly one of [`Observation::success`] or
    /// [`Observation::failure`] must follow before the iteration ends.
    pub fn start(&self) -> Observation {
        Observation {
            started: Instant::now(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Point-in-time totals for progress display and reporting.
    pub fn snapshot(&self) -> RequestTotals {
        let state = self.inner.lock().expect("counter state poisoned");
        let duration = state
            .last_request
            .and_then(|last| state.first_request.map(|first| last.duration_since(first)))
            .unwrap_or_default();
        let duration_secs = duration.as_secs_f64();
        let total = state.successes + state.failures;
        let rps = if duration_secs > 0.0 {
            total as f64 / duration_secs
        } else {
            0.0
        };

        RequestTotals {
            total,
            successes: state.successes,
            failures: state.failures,
            duration_secs,
            requests_per_second: rps,
            latency_p50_ms: state.latency_us.value_at_percentile(50.0) as f64 / 1000.0,
            latency_p75_ms: state.latency_us.value_at_percentile(75.0) as f64 / 1000.0,
            latency_p90_ms: state.latency_us.value_at_percentile(90.0) as f64 / 1000.0,
            latency_p95_ms: state.latency_us.value_at_percentile(95.0) as f64 / 1000.0,
            latency_p99_ms: state.latency_us.value_at_percentile(99.0) as f64 / 1000.0,
            latency_min_ms: state.latency_us.min() as f64 / 1000.0,
            latency_max_ms: state.latency_us.max() as f64 / 1000.0,
            latency_avg_ms: state.latency_us.mean() / 1000.0,
        }
    }
}

impl Default for RequestCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// One metrics record spanning a single iteration, from start to its
/// terminal success or failure mark. Both marks consume the observation,
/// so each one terminates exactly once.
pub struct Observation {
    started: Instant,
    inner: Arc<Mutex<CounterState>>,
}

impl Observation {
    /// Mark the observed request successful and record its latency.
    pub fn success(self) {
        let elapsed_us = self.started.elapsed().as_micros() as u64;
        let mut state = self.inner.lock().expect("counter state poisoned");
        state.successes += 1;
        state.latency_us.record(elapsed_us).ok();
        let now = Instant::now();
        state.first_request.get_or_insert(now);
        state.last_request = Some(now);
    }

    /// Mark the observed request failed. Latency of failed exchanges is not
    /// recorded.
    pub fn failure(self) {
        let mut state = self.inner.lock().expect("counter state poisoned");
        state.failures += 1;
        let now = Instant::now();
        state.first_request.get_or_insert(now);
        state.last_request = Some(now);
    }
}

/// Aggregated request totals. Latency figures are milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTotals {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    pub duration_secs: f64,
    pub requests_per_second: f64,
    pub latency_p50_ms: f64,
    pub latency_p75_ms: f64,
    pub latency_p90_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_min_ms: f64,
    pub latency_max_ms: f64,
    pub latency_avg_ms: f64,
}
