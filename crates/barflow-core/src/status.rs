//! # Connectivity & Sync Status
//!
//! Pure state for the offline/sync indicator shown by the UI.
//!
//! ## Two Independent Axes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Connectivity Status Machine                         │
//! │                                                                         │
//! │  Connectivity (platform signal)                                        │
//! │  ──────────────────────────────                                        │
//! │      Online ◄──────────────► Offline                                   │
//! │                                                                         │
//! │  Notification visibility (hide-timer owned by the tracker)             │
//! │  ─────────────────────────────────────────────────────────             │
//! │      Hidden ──transition──► Visible ──5000ms──► Hidden                 │
//! │                                ▲         │                             │
//! │                                └─────────┘                             │
//! │                      another transition re-arms the timer              │
//! │                                                                         │
//! │  → Offline               : wasOffline = true, show "offline", Arm      │
//! │  → Online (wasOffline)   : show "reconnected", Arm                     │
//! │  → Online (!wasOffline)  : nothing                                     │
//! │  timer fired             : hide; if online, wasOffline = false         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timer itself lives in `barflow-sync`. This module only says *when* to
//! arm it, so every transition is testable without a runtime.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Sync Queue Snapshot
// =============================================================================

/// Reactive state published by the external sync-queue collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncQueueSnapshot {
    pub is_online: bool,
    pub is_syncing: bool,
    /// Percentage, 0..=100.
    pub sync_progress: u8,
    pub queue_length: u32,
}

impl SyncQueueSnapshot {
    /// Creates a snapshot, clamping progress to 100.
    pub fn new(is_online: bool, is_syncing: bool, sync_progress: u8, queue_length: u32) -> Self {
        SyncQueueSnapshot {
            is_online,
            is_syncing,
            sync_progress: sync_progress.min(100),
            queue_length,
        }
    }

    /// Snapshot used when no sync queue is attached: online, idle, empty.
    pub const fn idle() -> Self {
        SyncQueueSnapshot {
            is_online: true,
            is_syncing: false,
            sync_progress: 0,
            queue_length: 0,
        }
    }
}

impl Default for SyncQueueSnapshot {
    fn default() -> Self {
        SyncQueueSnapshot::idle()
    }
}

// =============================================================================
// Sync Indicator
// =============================================================================

/// What the sync-progress view displays.
///
/// `PendingChanges` and `Syncing` never appear together: a device that is
/// offline is not actively syncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum SyncIndicator {
    /// Online, idle and nothing queued.
    Hidden,

    /// Offline with local changes waiting to be sent.
    PendingChanges {
        #[serde(rename = "queueLength")]
        queue_length: u32,
    },

    /// A sync run is in progress.
    Syncing { progress: u8 },
}

impl SyncIndicator {
    /// Derives the indicator from a queue snapshot.
    ///
    /// ```rust
    /// use barflow_core::{SyncIndicator, SyncQueueSnapshot};
    ///
    /// let offline = SyncQueueSnapshot::new(false, false, 0, 4);
    /// assert_eq!(
    ///     SyncIndicator::derive(&offline),
    ///     SyncIndicator::PendingChanges { queue_length: 4 }
    /// );
    /// ```
    pub fn derive(snapshot: &SyncQueueSnapshot) -> Self {
        if snapshot.is_online && snapshot.is_syncing {
            SyncIndicator::Syncing {
                progress: snapshot.sync_progress.min(100),
            }
        } else if !snapshot.is_online && snapshot.queue_length > 0 {
            SyncIndicator::PendingChanges {
                queue_length: snapshot.queue_length,
            }
        } else {
            SyncIndicator::Hidden
        }
    }

    /// True unless the indicator is hidden.
    pub fn is_visible(&self) -> bool {
        !matches!(self, SyncIndicator::Hidden)
    }
}

// =============================================================================
// Notification State Machine
// =============================================================================

/// Which connectivity notification is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ConnectivityNotice {
    /// "You are offline. Changes are saved locally."
    Offline,
    /// "Back online."
    Reconnected,
}

/// What the caller must do with its hide-timer after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Leave the timer alone.
    None,
    /// Cancel any pending timer and schedule a new one.
    Arm,
}

/// Connectivity axis plus notification visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationState {
    is_online: bool,
    was_offline: bool,
    notice: Option<ConnectivityNotice>,
}

impl NotificationState {
    /// Starts from the platform's current connectivity, notification hidden.
    pub const fn new(is_online: bool) -> Self {
        NotificationState {
            is_online,
            was_offline: false,
            notice: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn was_offline(&self) -> bool {
        self.was_offline
    }

    pub fn show_notification(&self) -> bool {
        self.notice.is_some()
    }

    pub fn notice(&self) -> Option<ConnectivityNotice> {
        self.notice
    }

    /// Applies a connectivity signal.
    ///
    /// A signal equal to the current state is not a transition and changes
    /// nothing.
    pub fn apply_connectivity(&mut self, online: bool) -> TimerAction {
        if online == self.is_online {
            return TimerAction::None;
        }
        self.is_online = online;

        if !online {
            self.was_offline = true;
            self.notice = Some(ConnectivityNotice::Offline);
            return TimerAction::Arm;
        }

        if self.was_offline {
            self.notice = Some(ConnectivityNotice::Reconnected);
            TimerAction::Arm
        } else {
            TimerAction::None
        }
    }

    /// Called when the hide-timer fires.
    pub fn hide_elapsed(&mut self) {
        self.notice = None;
        if self.is_online {
            self.was_offline = false;
        }
    }
}

// =============================================================================
// Connectivity Status
// =============================================================================

/// Derived status exposed to the UI, recomputed on every signal change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConnectivityStatus {
    pub is_online: bool,
    pub is_syncing: bool,
    pub sync_progress: u8,
    pub queue_length: u32,
    pub was_offline: bool,
    pub show_notification: bool,
    /// Which notification is visible, `None` when hidden.
    pub notice: Option<ConnectivityNotice>,
    /// Sync-progress view, derived from the queue snapshot alone.
    pub indicator: SyncIndicator,
}

impl ConnectivityStatus {
    /// Combines the notification state with the latest queue snapshot.
    ///
    /// `is_online` comes from the platform signal. The indicator is derived
    /// from the snapshot, including the snapshot's own online flag.
    pub fn compose(state: &NotificationState, queue: &SyncQueueSnapshot) -> Self {
        ConnectivityStatus {
            is_online: state.is_online(),
            is_syncing: queue.is_syncing,
            sync_progress: queue.sync_progress.min(100),
            queue_length: queue.queue_length,
            was_offline: state.was_offline(),
            show_notification: state.show_notification(),
            notice: state.notice(),
            indicator: SyncIndicator::derive(queue),
        }
    }

    /// The sync-progress view for this status.
    pub fn indicator(&self) -> SyncIndicator {
        self.indicator
    }
}

impl Default for ConnectivityStatus {
    /// Fail-open status: online, nothing queued, no notification.
    fn default() -> Self {
        ConnectivityStatus::compose(&NotificationState::new(true), &SyncQueueSnapshot::idle())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
