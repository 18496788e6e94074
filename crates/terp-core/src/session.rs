//! One client lifetime
//!
//! A [`Session`] owns the conversation state and every background activity
//! that feeds it. [`Session::mount`] starts them, [`Session::poll`] applies
//! whatever has completed, and [`Session::shutdown`] (or drop) cancels
//! everything still running.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::api::Transport;
use crate::dispatcher::MessageDispatcher;
use crate::facts::FactRefresher;
use crate::health::HealthMonitor;
use crate::rotation::{RotationScheduler, RotationWindow};
use crate::state::SessionState;

pub struct Session {
    transport: Arc<dyn Transport>,
    state: SessionState,
    dispatcher: MessageDispatcher,
    health: HealthMonitor,
    facts: FactRefresher,
    rotation: RotationScheduler,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, rotation_interval: Duration) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(Arc::clone(&transport)),
            facts: FactRefresher::new(Arc::clone(&transport)),
            health: HealthMonitor::new(),
            rotation: RotationScheduler::new(rotation_interval),
            state: SessionState::new(),
            transport,
        }
    }

    /// Kick off the startup work: health probe, first fact, rotation timer.
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self) {
        info!("session mounted");
        self.health.start(Arc::clone(&self.transport));
        self.facts.fetch_fact();
        if self.quick_replies_visible() {
            self.rotation.start();
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Submit free text. Returns false if the submission was ignored.
    ///
    /// The first accepted message hides the quick replies, so their rotation
    /// timer is stopped with it.
    pub fn submit(&mut self, text: &str) -> bool {
        let accepted = self.dispatcher.send(&mut self.state, text);
        if accepted && self.rotation.is_running() {
            self.rotation.stop();
        }
        accepted
    }

    /// Send the prompt of the quick reply in a visible slot
    pub fn select_quick_reply(&mut self, slot: usize) -> bool {
        match self.rotation.window().get(slot) {
            Some(reply) => self.submit(reply.prompt),
            None => false,
        }
    }

    pub fn quick_replies(&self) -> RotationWindow {
        self.rotation.window()
    }

    /// Quick replies are only offered before the conversation starts
    pub fn quick_replies_visible(&self) -> bool {
        self.state.messages().is_empty()
    }

    pub fn refresh_fact(&mut self) {
        self.facts.fetch_fact();
    }

    pub fn fact(&self) -> &str {
        self.facts.fact()
    }

    pub fn is_loading_fact(&self) -> bool {
        self.facts.is_loading_fact()
    }

    /// Apply every background result that has completed. Returns true if
    /// anything changed.
    pub async fn poll(&mut self) -> bool {
        let health = self.health.poll(&mut self.state).await;
        let chat = self.dispatcher.poll(&mut self.state).await;
        let fact = self.facts.poll().await;
        health || chat || fact
    }

    /// Wait for all outstanding background work (except the rotation timer)
    pub async fn settle(&mut self) {
        self.health.settle(&mut self.state).await;
        self.dispatcher.settle(&mut self.state).await;
        self.facts.settle().await;
    }

    pub fn shutdown(&mut self) {
        self.rotation.stop();
        self.dispatcher.abort(&mut self.state);
        self.health.abort();
        self.facts.abort();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
