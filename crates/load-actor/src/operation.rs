//! Polymorphic request operations.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::body::BodyGenerator;
use crate::error::TransportError;

/// One unit of work: a single request/response exchange against a resolved
/// endpoint, blocking until the exchange completes or fails.
///
/// The kind set is closed and configuration-driven, so this is a tagged
/// variant with one dispatch point rather than a trait hierarchy; adding a
/// verb is a new arm in [`Operation::run`].
#[derive(Debug)]
pub enum Operation {
    Get {
        timeout: Duration,
    },
    Post {
        timeout: Duration,
        generator: BodyGenerator,
    },
}

impl Operation {
    pub fn get(timeout: Duration) -> Self {
        Operation::Get { timeout }
    }

    pub fn post(timeout: Duration, generator: BodyGenerator) -> Self {
        Operation::Post { timeout, generator }
    }

    /// Execute exactly one exchange against `endpoint`.
    ///
    /// Success is transport-level: any received response counts, non-2xx
    /// included. Status codes are not inspected here. Transport failures
    /// (connect, timeout, malformed response) are returned, never swallowed.
    pub fn run(&mut self, endpoint: &str) -> Result<(), TransportError> {
        match self {
            Operation::Get { timeout } => {
                let client = session(*timeout)?;
                let response = client.get(endpoint).send()?;
                let status = response.status();
                let body = response.text()?;
                debug!(%status, bytes = body.len(), "GET response");
                Ok(())
            }
            Operation::Post { timeout, generator } => {
                // Regenerated on every call; bodies are never reused.
                let body = generator.produce();
                let json = serde_json::to_string(&body)?;
                let client = session(*timeout)?;
                let response = client
                    .post(endpoint)
                    .header(CONTENT_TYPE, "application/json")
                    .body(json)
                    .send()?;
                let status = response.status();
                let body = response.text()?;
                debug!(%status, bytes = body.len(), "POST response");
                Ok(())
            }
        }
    }
}

/// Build the transport session for a single exchange. The session is
/// created fresh per call and dropped before `run` returns, so no
/// connection state outlives one request.
fn session(timeout: Duration) -> Result<Client, TransportError> {
    Ok(Client::builder().timeout(timeout).build()?)
}
