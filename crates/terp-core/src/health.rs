//! Startup health probe
//!
//! Runs once per session: `health()` first, then `greeting()` only if the
//! health call itself succeeded.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::Transport;
use crate::state::SessionState;

/// Greeting used whenever the backend cannot supply one
pub const DEFAULT_GREETING: &str = "Good day";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub healthy: bool,
    pub greeting: String,
}

impl HealthReport {
    fn unreachable() -> Self {
        Self {
            healthy: false,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }

    pub fn apply(self, state: &mut SessionState) {
        state.backend_healthy = self.healthy;
        state.greeting = self.greeting;
    }
}

pub async fn probe(transport: &dyn Transport) -> HealthReport {
    let healthy = match transport.health().await {
        Ok(health) => {
            info!(
                status = %health.status,
                model_loaded = health.model_loaded,
                index_loaded = health.index_loaded,
                "backend health"
            );
            health.is_healthy()
        }
        Err(err) => {
            warn!(error = %err, "health check failed");
            return HealthReport::unreachable();
        }
    };

    match transport.greeting().await {
        Ok(response) => HealthReport {
            healthy,
            greeting: response.greeting,
        },
        Err(err) => {
            warn!(error = %err, "greeting request failed");
            HealthReport::unreachable()
        }
    }
}

#[derive(Default)]
pub struct HealthMonitor {
    task: Option<JoinHandle<HealthReport>>,
    started: bool,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the probe. Only the first call per monitor does anything.
    pub fn start(&mut self, transport: Arc<dyn Transport>) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        self.task = Some(tokio::spawn(async move { probe(transport.as_ref()).await }));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    pub async fn poll(&mut self, state: &mut SessionState) -> bool {
        let finished = self.task.as_ref().is_some_and(|task| task.is_finished());
        if finished {
            self.settle(state).await;
        }
        finished
    }

    pub async fn settle(&mut self, state: &mut SessionState) {
        if let Some(task) = self.task.take() {
            let report = task.await.unwrap_or_else(|err| {
                warn!(error = %err, "health probe task did not complete");
                HealthReport::unreachable()
            });
            report.apply(state);
        }
    }

    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::error::TransportError;

    #[tokio::test]
    async fn test_healthy_backend_with_greeting() {
        let mock = MockTransport::new();
        mock.queue_health(Ok("healthy"));
        mock.queue_greeting(Ok("Good afternoon"));

        let report = probe(&mock).await;
        assert_eq!(
            report,
            HealthReport {
                healthy: true,
                greeting: "Good afternoon".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_network_failure_skips_greeting() {
        let mock = MockTransport::new();
        mock.queue_health(Err(TransportError::new("connection refused")));
        mock.queue_greeting(Ok("should not be used"));

        let report = probe(&mock).await;
        assert!(!report.healthy);
        assert_eq!(report.greeting, DEFAULT_GREETING);
        assert_eq!(mock.greeting_call_count(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_status_still_fetches_greeting() {
        let mock = MockTransport::new();
        mock.queue_health(Ok("degraded"));
        mock.queue_greeting(Ok("Good evening"));

        let report = probe(&mock).await;
        assert!(!report.healthy);
        assert_eq!(report.greeting, "Good evening");
        assert_eq!(mock.greeting_call_count(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_status_with_greeting_failure() {
        let mock = MockTransport::new();
        mock.queue_health(Ok("degraded"));
        mock.queue_greeting(Err(TransportError::status(502)));

        let report = probe(&mock).await;
        assert!(!report.healthy);
        assert_eq!(report.greeting, DEFAULT_GREETING);
        assert_eq!(mock.greeting_call_count(), 1);
    }

    #[tokio::test]
    async fn test_greeting_failure_marks_unhealthy() {
        let mock = MockTransport::new();
        mock.queue_health(Ok("healthy"));
        mock.queue_greeting(Err(TransportError::status(500)));

        let report = probe(&mock).await;
        assert!(!report.healthy);
        assert_eq!(report.greeting, DEFAULT_GREETING);
    }

    #[tokio::test]
    async fn test_monitor_runs_once_and_updates_state() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_health(Err(TransportError::new("offline")));

        let mut monitor = HealthMonitor::new();
        let mut state = SessionState::new();
        assert!(state.backend_healthy());

        assert!(monitor.start(mock.clone()));
        assert!(!monitor.start(mock.clone()));
        monitor.settle(&mut state).await;

        assert!(!state.backend_healthy());
        assert_eq!(state.greeting(), DEFAULT_GREETING);
        assert!(!monitor.is_pending());
    }
}
