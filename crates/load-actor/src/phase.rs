//! Phase setup-time resolution.

use std::time::Duration;

use crate::body::BodyGenerator;
use crate::config::PhaseDecl;
use crate::error::ConfigError;
use crate::operation::Operation;

/// Options shared by every phase of one actor instance.
pub struct ResolveOptions {
    pub timeout: Duration,
    pub seed: Option<u64>,
}

/// A resolved workload phase.
///
/// `Nop` placeholders participate in phase advancement but issue no
/// requests and open no observations.
#[derive(Debug)]
pub enum Phase {
    Nop,
    Active(PhaseConfig),
}

/// Static configuration of one active phase, resolved once at setup and
/// reused for every iteration. The operation kind is fixed for the
/// lifetime of the phase.
#[derive(Debug)]
pub struct PhaseConfig {
    pub route: String,
    pub repeat: u64,
    pub operation: Operation,
}

impl Phase {
    /// Resolve one phase declaration.
    ///
    /// Unrecognized operation kinds and missing or malformed body templates
    /// are rejected here, at setup, not at first use.
    pub fn resolve(
        index: usize,
        decl: &PhaseDecl,
        opts: &ResolveOptions,
    ) -> Result<Phase, ConfigError> {
        if decl.nop {
            return Ok(Phase::Nop);
        }

        let route = decl
            .route
            .clone()
            .ok_or(ConfigError::MissingRoute(index))?;
        let kind = decl
            .operation
            .as_deref()
            .ok_or(ConfigError::MissingOperation(index))?;

        let operation = match kind {
            "GET" => Operation::get(opts.timeout),
            "POST" => {
                let template = decl.body.as_ref().ok_or(ConfigError::MissingBody(index))?;
                let generator = BodyGenerator::from_template(template, opts.seed)
                    .map_err(|source| ConfigError::BadBody { index, source })?;
                Operation::post(opts.timeout, generator)
            }
            other => {
                return Err(ConfigError::UnknownOperation {
                    index,
                    kind: other.to_string(),
                })
            }
        };

        Ok(Phase::Active(PhaseConfig {
            route,
            repeat: decl.repeat,
            operation,
        }))
    }
}
