//! # Hide Timer
//!
//! Single-slot delayed signal used to auto-hide connectivity notifications.
//!
//! Arming always cancels the pending timer first, so at most one fire is
//! outstanding. Each arm gets a new generation number; the owner checks
//! [`HideTimer::is_current`] on receipt so a fire that was already queued
//! when the timer was re-armed or cancelled is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Cancel-and-reschedule timer delivering its generation on `fired_tx`.
#[derive(Debug)]
pub struct HideTimer {
    fired_tx: mpsc::UnboundedSender<u64>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl HideTimer {
    /// Creates the timer and the receiver its fires arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let timer = HideTimer {
            fired_tx,
            pending: None,
            generation: 0,
        };
        (timer, fired_rx)
    }

    /// Schedules a fire after `after`, replacing any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, after: Duration) -> u64 {
        self.cancel();

        let generation = self.generation;
        let fired_tx = self.fired_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the owner shut down
            let _ = fired_tx.send(generation);
        }));

        trace!(generation, after_ms = after.as_millis() as u64, "Hide timer armed");
        generation
    }

    /// Cancels the pending fire, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// True if `generation` belongs to the most recent arm.
    ///
    /// Marks the timer idle when it does.
    pub fn is_current(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// True while a fire is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for HideTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
