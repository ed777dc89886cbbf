//! # Offline/Sync State Tracker
//!
//! Consumes the connectivity events and the sync-queue signal, runs the
//! [`NotificationState`] machine and publishes a derived
//! [`ConnectivityStatus`].
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ConnectivityTracker task                            │
//! │                                                                         │
//! │  mpsc<bool> ────────────┐                                               │
//! │  (every transition)     │                                               │
//! │                         ▼                                               │
//! │  watch<SyncQueue> ──► select! ──► NotificationState ──► watch<Status>  │
//! │  (external queue)       ▲              │                    │           │
//! │                         │              │ TimerAction::Arm   ▼           │
//! │  HideTimer fires ───────┘              └──► HideTimer  TrackerHandle    │
//! │  shutdown ──────────────► break                        status()         │
//! │                                                        indicator()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing connectivity signal is treated as always online and the
//! tracker never notifies. A missing queue signal reads as an idle queue.
//! When a signal's sender goes away the last value is kept.
//!
//! Connectivity is a queue rather than a latest-value channel: an offline
//! blip that is over before the task runs must still set `was_offline`.

use std::time::Duration;

use barflow_core::{
    ConnectivityStatus, NotificationState, SyncIndicator, SyncQueueSnapshot, TimerAction,
    DEFAULT_NOTIFICATION_MS,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConnectivitySettings;
use crate::error::{SyncError, SyncResult};
use crate::timer::HideTimer;

// =============================================================================
// Tracker Configuration
// =============================================================================

/// Tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How long a notification stays visible after a transition.
    pub notification_window: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            notification_window: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
        }
    }
}

impl From<&ConnectivitySettings> for TrackerConfig {
    fn from(settings: &ConnectivitySettings) -> Self {
        TrackerConfig {
            notification_window: settings.notification_window(),
        }
    }
}

impl TrackerConfig {
    pub fn with_notification_window(mut self, window: Duration) -> Self {
        self.notification_window = window;
        self
    }
}

// =============================================================================
// Connectivity Signal
// =============================================================================

/// Platform connectivity feed: the state at startup followed by every
/// later transition, in order (`true` = online).
#[derive(Debug)]
pub struct ConnectivitySignal {
    initial: bool,
    changes: mpsc::UnboundedReceiver<bool>,
}

impl ConnectivitySignal {
    /// Creates a signal and the sender the platform reports through.
    ///
    /// Debouncing is up to the platform; every value sent is applied.
    pub fn channel(initial: bool) -> (mpsc::UnboundedSender<bool>, Self) {
        let (tx, changes) = mpsc::unbounded_channel();
        (tx, ConnectivitySignal { initial, changes })
    }
}

// =============================================================================
// Tracker Handle
// =============================================================================

/// Handle to a running tracker.
///
/// Dropping the handle stops the tracker, like [`TrackerHandle::shutdown`]
/// without waiting for the task to finish.
#[derive(Debug)]
pub struct TrackerHandle {
    status_rx: watch::Receiver<ConnectivityStatus>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    /// Returns the latest status.
    pub fn status(&self) -> ConnectivityStatus {
        *self.status_rx.borrow()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityStatus> {
        self.status_rx.clone()
    }

    /// Sync-progress view of the latest queue snapshot.
    pub fn indicator(&self) -> SyncIndicator {
        self.status().indicator()
    }

    /// Stops the tracker, cancelling any pending hide timer and detaching
    /// from both signals.
    pub async fn shutdown(self) -> SyncResult<()> {
        let TrackerHandle {
            shutdown_tx, task, ..
        } = self;

        // A closed channel means the task already exited
        let _ = shutdown_tx.send(()).await;
        drop(shutdown_tx);

        task.await
            .map_err(|e| SyncError::Internal(format!("Tracker task failed: {e}")))
    }
}

// =============================================================================
// Tracker
// =============================================================================

/// Connectivity and sync-queue observer.
pub struct ConnectivityTracker {
    config: TrackerConfig,
    state: NotificationState,
    queue: SyncQueueSnapshot,
    connectivity_rx: Option<mpsc::UnboundedReceiver<bool>>,
    queue_rx: Option<watch::Receiver<SyncQueueSnapshot>>,
    status_tx: watch::Sender<ConnectivityStatus>,
}

impl ConnectivityTracker {
    /// Starts the tracker on the current tokio runtime.
    ///
    /// The initial values of both signals are adopted without a
    /// notification; only later transitions notify.
    pub fn spawn(
        config: TrackerConfig,
        connectivity: Option<ConnectivitySignal>,
        queue: Option<watch::Receiver<SyncQueueSnapshot>>,
    ) -> TrackerHandle {
        let mut queue_rx = queue;

        let (is_online, connectivity_rx) = match connectivity {
            Some(signal) => (signal.initial, Some(signal.changes)),
            None => {
                warn!("No connectivity signal, assuming online");
                (true, None)
            }
        };
        let queue = queue_rx
            .as_mut()
            .map(|rx| *rx.borrow_and_update())
            .unwrap_or_else(SyncQueueSnapshot::idle);

        let state = NotificationState::new(is_online);
        let (status_tx, status_rx) = watch::channel(ConnectivityStatus::compose(&state, &queue));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let tracker = ConnectivityTracker {
            config,
            state,
            queue,
            connectivity_rx,
            queue_rx,
            status_tx,
        };

        let task = tokio::spawn(tracker.run(shutdown_rx));

        TrackerHandle {
            status_rx,
            shutdown_tx,
            task,
        }
    }

    /// Main tracker loop.
    async fn run(mut self, mut shutdown_rx: mpsc::Receiver<()>) {
        let (mut timer, mut fired_rx) = HideTimer::new();

        info!(
            online = self.state.is_online(),
            window_ms = self.config.notification_window.as_millis() as u64,
            "Connectivity tracker started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Connectivity tracker shutting down");
                    break;
                }
                online = next_event(&mut self.connectivity_rx) => {
                    if let Some(online) = online {
                        self.on_connectivity(online, &mut timer);
                    }
                }
                snapshot = next_value(&mut self.queue_rx) => {
                    if let Some(snapshot) = snapshot {
                        self.queue = snapshot;
                        self.publish();
                    }
                }
                Some(generation) = fired_rx.recv() => {
                    if timer.is_current(generation) {
                        self.state.hide_elapsed();
                        debug!(online = self.state.is_online(), "Notification hidden");
                        self.publish();
                    }
                }
            }
        }

        timer.cancel();
    }

    fn on_connectivity(&mut self, online: bool, timer: &mut HideTimer) {
        match self.state.apply_connectivity(online) {
            TimerAction::Arm => {
                info!(online, notice = ?self.state.notice(), "Connectivity changed");
                timer.arm(self.config.notification_window);
            }
            TimerAction::None => {
                debug!(online, "Connectivity signal without notification");
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.status_tx
            .send_replace(ConnectivityStatus::compose(&self.state, &self.queue));
    }
}

/// Waits for the next connectivity transition.
///
/// Resolves to `None` once every sender is gone, after which the queue is
/// dropped and never polled again.
async fn next_event(signal: &mut Option<mpsc::UnboundedReceiver<bool>>) -> Option<bool> {
    let Some(rx) = signal.as_mut() else {
        return std::future::pending().await;
    };

    match rx.recv().await {
        Some(online) => Some(online),
        None => {
            debug!("Connectivity sender dropped, keeping last value");
            *signal = None;
            None
        }
    }
}

/// Waits for the next value of an optional latest-value signal.
///
/// Resolves to `None` once the sender is gone, after which the signal is
/// dropped and never polled again.
async fn next_value<T: Copy>(signal: &mut Option<watch::Receiver<T>>) -> Option<T> {
    let Some(rx) = signal.as_mut() else {
        return std::future::pending().await;
    };

    match rx.changed().await {
        Ok(()) => Some(*rx.borrow_and_update()),
        Err(_) => {
            debug!("Signal sender dropped, keeping last value");
            *signal = None;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barflow_core::ConnectivityNotice;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_millis(5000);

    fn spawn_with_signal(online: bool) -> (mpsc::UnboundedSender<bool>, TrackerHandle) {
        let (tx, signal) = ConnectivitySignal::channel(online);
        let handle = ConnectivityTracker::spawn(TrackerConfig::default(), Some(signal), None);
        (tx, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_notification_auto_hides() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();
        let start = Instant::now();

        tx.send(false).unwrap();
        let shown = *status.wait_for(|s| s.show_notification).await.unwrap();
        assert!(!shown.is_online);
        assert!(shown.was_offline);
        assert_eq!(shown.notice, Some(ConnectivityNotice::Offline));

        let hidden = *status.wait_for(|s| !s.show_notification).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= WINDOW && elapsed < WINDOW + Duration::from_millis(10));

        // Still offline, so the flag survives the window
        assert!(hidden.was_offline);
        assert_eq!(hidden.notice, None);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_rearms_timer() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();
        let start = Instant::now();

        tx.send(false).unwrap();
        status.wait_for(|s| s.show_notification).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        tx.send(true).unwrap();
        status
            .wait_for(|s| s.notice == Some(ConnectivityNotice::Reconnected))
            .await
            .unwrap();

        // The first window would have closed at 5000ms
        tokio::time::sleep_until(start + Duration::from_millis(5500)).await;
        assert!(handle.status().show_notification);

        let hidden = *status.wait_for(|s| !s.show_notification).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(7000));
        assert!(elapsed < Duration::from_millis(7010));
        assert!(hidden.is_online);
        assert!(!hidden.was_offline);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_spurious_online_does_not_notify() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();

        tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!status.borrow_and_update().show_notification);
        assert!(!handle.status().was_offline);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_signal_fails_open() {
        let handle = ConnectivityTracker::spawn(TrackerConfig::default(), None, None);

        tokio::time::sleep(Duration::from_secs(30)).await;

        let status = handle.status();
        assert!(status.is_online);
        assert_eq!(status.queue_length, 0);
        assert!(!status.show_notification);
        assert_eq!(handle.indicator(), SyncIndicator::Hidden);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_snapshot_flows_into_status() {
        let (conn_tx, signal) = ConnectivitySignal::channel(false);
        let (queue_tx, queue_rx) = watch::channel(SyncQueueSnapshot::idle());
        let handle =
            ConnectivityTracker::spawn(TrackerConfig::default(), Some(signal), Some(queue_rx));
        let mut status = handle.subscribe();

        // Starting offline adopts the value without notifying
        assert!(!handle.status().is_online);
        assert!(!handle.status().show_notification);

        queue_tx
            .send(SyncQueueSnapshot::new(false, false, 0, 3))
            .unwrap();
        status.wait_for(|s| s.queue_length == 3).await.unwrap();
        assert_eq!(
            handle.indicator(),
            SyncIndicator::PendingChanges { queue_length: 3 }
        );

        conn_tx.send(true).unwrap();
        queue_tx
            .send(SyncQueueSnapshot::new(true, true, 40, 3))
            .unwrap();
        status
            .wait_for(|s| s.is_online && s.is_syncing)
            .await
            .unwrap();
        assert_eq!(handle.indicator(), SyncIndicator::Syncing { progress: 40 });

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_signal_keeps_last_value() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();

        tx.send(false).unwrap();
        status.wait_for(|s| !s.is_online).await.unwrap();
        drop(tx);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!handle.status().is_online);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_timer() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();

        tx.send(false).unwrap();
        status.wait_for(|s| s.show_notification).await.unwrap();

        handle.shutdown().await.unwrap();
        tokio::time::sleep(WINDOW * 2).await;

        // Task is gone, so the notification was never hidden
        assert!(status.borrow().show_notification);
        assert!(status.has_changed().is_err());
        assert!(tx.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_transitions_are_not_collapsed() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();
        let start = Instant::now();

        // Both queued before the task gets to run
        tx.send(false).unwrap();
        tx.send(true).unwrap();

        let shown = *status
            .wait_for(|s| s.notice == Some(ConnectivityNotice::Reconnected))
            .await
            .unwrap();
        assert!(shown.is_online);
        assert!(shown.was_offline);
        assert!(shown.show_notification);

        let hidden = *status.wait_for(|s| !s.show_notification).await.unwrap();
        assert!(start.elapsed() < WINDOW + Duration::from_millis(10));
        assert!(!hidden.was_offline);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_then_offline_single_window() {
        let (tx, handle) = spawn_with_signal(true);
        let mut status = handle.subscribe();

        tx.send(false).unwrap();
        status.wait_for(|s| s.show_notification).await.unwrap();
        let settled = *status.wait_for(|s| !s.show_notification).await.unwrap();
        assert!(settled.was_offline);

        let t0 = Instant::now();
        tx.send(true).unwrap();
        status
            .wait_for(|s| s.notice == Some(ConnectivityNotice::Reconnected))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        tx.send(false).unwrap();
        status
            .wait_for(|s| s.notice == Some(ConnectivityNotice::Offline))
            .await
            .unwrap();

        // Only the window armed at 2000ms is live
        tokio::time::sleep_until(t0 + Duration::from_millis(5500)).await;
        assert!(handle.status().show_notification);

        let hidden = *status.wait_for(|s| !s.show_notification).await.unwrap();
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(7000));
        assert!(elapsed < Duration::from_millis(7010));
        assert!(!hidden.is_online);
        assert!(hidden.was_offline);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicator_uses_queue_connectivity() {
        // No platform signal: status reads online, the queue still reports offline
        let (_queue_tx, queue_rx) = watch::channel(SyncQueueSnapshot::new(false, false, 0, 3));
        let handle = ConnectivityTracker::spawn(TrackerConfig::default(), None, Some(queue_rx));

        assert!(handle.status().is_online);
        assert_eq!(
            handle.indicator(),
            SyncIndicator::PendingChanges { queue_length: 3 }
        );

        handle.shutdown().await.unwrap();
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ConnectivitySettings {
            notification_ms: 1500,
        };
        let config = TrackerConfig::from(&settings);
        assert_eq!(config.notification_window, Duration::from_millis(1500));
        assert_eq!(
            TrackerConfig::default().with_notification_window(WINDOW),
            TrackerConfig::default()
        );
    }
}
