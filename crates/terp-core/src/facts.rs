//! Sidebar fun fact
//!
//! Fetches are numbered when issued. A response only replaces the displayed
//! fact if it belongs to a newer fetch than the one currently shown, so an
//! older request that resolves late cannot overwrite a newer fact.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{FunFactResponse, Transport};
use crate::error::TransportError;

/// Shown whenever the backend cannot supply a fact
pub const FALLBACK_FACT: &str =
    "UMD's mascot Testudo is a diamondback terrapin, Maryland's state reptile.";

type FactTask = JoinHandle<Result<FunFactResponse, TransportError>>;

pub struct FactRefresher {
    transport: Arc<dyn Transport>,
    fact: String,
    pending: Vec<(u64, FactTask)>,
    next_seq: u64,
    shown_seq: Option<u64>,
}

impl FactRefresher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            fact: String::new(),
            pending: Vec::new(),
            next_seq: 0,
            shown_seq: None,
        }
    }

    pub fn fact(&self) -> &str {
        &self.fact
    }

    pub fn is_loading_fact(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn fetch_fact(&mut self) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let transport = Arc::clone(&self.transport);
        let task = tokio::spawn(async move { transport.fun_fact().await });
        self.pending.push((seq, task));
        debug!(seq, "fetching fun fact");
    }

    /// Apply every fetch that has finished. Returns true if anything settled.
    pub async fn poll(&mut self) -> bool {
        let (finished, still_pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(_, task)| task.is_finished());
        self.pending = still_pending;

        let settled = !finished.is_empty();
        for (seq, task) in finished {
            let outcome = task
                .await
                .unwrap_or_else(|err| Err(TransportError::interrupted(err)));
            self.apply(seq, outcome);
        }
        settled
    }

    /// Wait for every outstanding fetch
    pub async fn settle(&mut self) {
        for (seq, task) in std::mem::take(&mut self.pending) {
            let outcome = task
                .await
                .unwrap_or_else(|err| Err(TransportError::interrupted(err)));
            self.apply(seq, outcome);
        }
    }

    pub fn abort(&mut self) {
        for (_, task) in self.pending.drain(..) {
            task.abort();
        }
    }

    fn apply(&mut self, seq: u64, outcome: Result<FunFactResponse, TransportError>) {
        if self.shown_seq.is_some_and(|shown| shown > seq) {
            debug!(seq, "discarding stale fun fact");
            return;
        }

        self.fact = match outcome {
            Ok(response) => response.fact,
            Err(err) => {
                warn!(error = %err, "fun fact request failed");
                FALLBACK_FACT.to_string()
            }
        };
        self.shown_seq = Some(seq);
    }
}

impl Drop for FactRefresher {
    fn drop(&mut self) {
        self.abort();
    }
}
