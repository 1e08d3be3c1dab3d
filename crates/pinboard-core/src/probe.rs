//! Availability probe and the shared last-known-mode handle.
//!
//! The probe issues a lightweight health request with a short timeout; any
//! transport failure, timeout, or non-success status reads as "local mode"
//! without raising to the caller. Full data refreshes re-probe; every other
//! operation branches on the last-known verdict.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// The operating mode selected by the probe's last verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Operations hit the remote API.
    Remote,
    /// Operations fall back to the local persisted store.
    Local,
}

/// Shared last-known availability verdict.
///
/// Starts out local; the first successful probe switches to remote.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    remote: Arc<AtomicBool>,
}

impl Availability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.remote.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.is_remote() {
            Mode::Remote
        } else {
            Mode::Local
        }
    }

    /// Record a new verdict. Used by the probe, and by services demoting to
    /// local mode after a transport failure mid-session.
    pub fn mark(&self, remote: bool) {
        self.remote.store(remote, Ordering::Relaxed);
    }
}

/// Health-check client for the remote service.
#[derive(Debug, Clone)]
pub struct AvailabilityProbe {
    health_url: String,
    client: reqwest::Client,
    state: Availability,
}

impl AvailabilityProbe {
    /// Build a probe for the given API base URL.
    ///
    /// The probe gets its own HTTP client so the short timeout never
    /// applies to regular gateway calls.
    pub fn new(api_url: &str, timeout: Duration, state: Availability) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            health_url: format!("{api_url}/health"),
            client,
            state,
        })
    }

    /// Probe the remote service once and record the verdict.
    ///
    /// Idempotent and side-effect free on the remote; failures are swallowed
    /// and logged.
    pub async fn check(&self) -> bool {
        let remote = match self.client.get(&self.health_url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!("health probe returned HTTP {}", response.status());
                false
            }
            Err(error) => {
                tracing::debug!("remote not detected, using local store mode: {error}");
                false
            }
        };
        self.state.mark(remote);
        remote
    }

    /// The shared handle other components consult between probes.
    #[must_use]
    pub fn availability(&self) -> Availability {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_starts_local() {
        let availability = Availability::new();
        assert!(!availability.is_remote());
        assert_eq!(availability.mode(), Mode::Local);
    }

    #[test]
    fn mark_is_shared_across_clones() {
        let availability = Availability::new();
        let observer = availability.clone();
        availability.mark(true);
        assert_eq!(observer.mode(), Mode::Remote);
        availability.mark(false);
        assert_eq!(observer.mode(), Mode::Local);
    }

    #[tokio::test]
    async fn probe_failure_reads_as_local() {
        let state = Availability::new();
        state.mark(true);
        // Port 1 on loopback refuses connections immediately.
        let probe = AvailabilityProbe::new(
            "http://127.0.0.1:1/api",
            Duration::from_millis(200),
            state.clone(),
        )
        .unwrap();
        assert!(!probe.check().await);
        assert_eq!(state.mode(), Mode::Local);
    }
}
