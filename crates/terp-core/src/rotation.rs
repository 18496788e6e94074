//! Quick-reply carousel
//!
//! A fixed list of six suggested prompts, shown two at a time. A background
//! timer advances the window by two every interval. The timer is owned by the
//! scheduler: [`RotationScheduler::stop`] (or dropping the scheduler) always
//! cancels it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_millis(5000);

/// Number of quick replies visible at once
pub const WINDOW_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickReply {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const QUICK_REPLIES: [QuickReply; 6] = [
    QuickReply {
        label: "Course Reviews",
        prompt: "Show me some popular computer science courses",
    },
    QuickReply {
        label: "Professor Info",
        prompt: "Who are the best professors for CMSC131?",
    },
    QuickReply {
        label: "Dining Halls",
        prompt: "What are the best dining halls on campus?",
    },
    QuickReply {
        label: "Course Schedule",
        prompt: "When does registration open for next semester?",
    },
    QuickReply {
        label: "Study Tips",
        prompt: "Give me some study tips for finals week",
    },
    QuickReply {
        label: "Campus Life",
        prompt: "What are some fun things to do on campus?",
    },
];

/// The visible slice of the carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationWindow {
    pub start_index: usize,
}

impl RotationWindow {
    pub fn items(&self) -> [&'static QuickReply; WINDOW_SIZE] {
        [self.item(0), self.item(1)]
    }

    /// The reply in a visible slot (0 or 1)
    pub fn get(&self, slot: usize) -> Option<&'static QuickReply> {
        (slot < WINDOW_SIZE).then(|| self.item(slot))
    }

    fn item(&self, slot: usize) -> &'static QuickReply {
        &QUICK_REPLIES[(self.start_index + slot) % QUICK_REPLIES.len()]
    }
}

pub struct RotationScheduler {
    index: Arc<AtomicUsize>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl RotationScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            index: Arc::new(AtomicUsize::new(0)),
            interval,
            timer: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub fn window(&self) -> RotationWindow {
        RotationWindow {
            start_index: self.current_index(),
        }
    }

    /// Move the window forward by one step
    pub fn advance(&self) {
        advance_index(&self.index);
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start the recurring timer. Does nothing if it is already running.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let index = Arc::clone(&self.index);
        let period = self.interval;
        self.timer = Some(tokio::spawn(async move {
            // First tick one full period after mount, not immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                advance_index(&index);
                trace!(index = index.load(Ordering::Relaxed), "rotated quick replies");
            }
        }));
        debug!(interval_ms = period.as_millis() as u64, "rotation timer started");
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("rotation timer stopped");
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn advance_index(index: &AtomicUsize) {
    let _ = index.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| {
        Some((i + WINDOW_SIZE) % QUICK_REPLIES.len())
    });
}
