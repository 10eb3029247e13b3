//! Phase-driven HTTP load generation.
//!
//! This crate provides tools to:
//! - Describe an HTTP workload as an ordered list of phases
//! - Execute workloads with one or more independent actor instances
//! - Generate varying JSON request bodies per iteration
//! - Collect per-request outcome metrics
//! - Output results in multiple formats (console, JSON, CSV)
//!
//! Each actor instance drives its phases strictly sequentially on its own
//! thread; parallelism comes from running several instances side by side.

pub mod actor;
pub mod body;
pub mod config;
pub mod error;
pub mod metrics;
pub mod operation;
pub mod phase;
pub mod report;
pub mod runner;

pub use actor::HttpActor;
pub use body::BodyGenerator;
pub use config::{PhaseDecl, WorkloadConfig};
pub use error::{ConfigError, TransportError};
pub use metrics::{Observation, RequestCounters, RequestTotals};
pub use operation::Operation;
pub use phase::{Phase, PhaseConfig};
pub use report::{RunReport, RunSummary};
pub use runner::{ActorFailure, RunOutcome, WorkloadRunner};
