//! Workload configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phase::{Phase, ResolveOptions};

/// Whole-workload configuration loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_url: String,
    /// Number of independent actor instances (one thread each).
    #[serde(default = "default_actors")]
    pub actors: u32,
    /// Transport timeout applied to every exchange.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional RNG seed for reproducible request bodies.
    #[serde(default)]
    pub seed: Option<u64>,
    pub phases: Vec<PhaseDecl>,
}

/// One declared workload phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDecl {
    /// Placeholder phase: participates in phase ordering but issues no
    /// requests.
    #[serde(default)]
    pub nop: bool,
    /// Route suffix appended to the base URL, verbatim.
    #[serde(default)]
    pub route: Option<String>,
    /// Operation kind: "GET" or "POST".
    #[serde(default)]
    pub operation: Option<String>,
    /// Iterations of this phase.
    #[serde(default = "default_repeat")]
    pub repeat: u64,
    /// Body template, required for POST.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_actors() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_repeat() -> u64 {
    1
}

impl WorkloadConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Validate the workload before any actor is built.
    ///
    /// Runs the same phase resolution actors perform, so a workload that
    /// validates cannot fail at setup later: unrecognized operation kinds,
    /// missing routes and missing or malformed POST bodies are all caught
    /// here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors == 0 {
            return Err(ConfigError::NoActors);
        }
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        let opts = ResolveOptions {
            timeout: self.timeout(),
            seed: self.seed,
        };
        for (index, decl) in self.phases.iter().enumerate() {
            Phase::resolve(index, decl, &opts)?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
