//! # Data-Change Event Bus
//!
//! In-process publish/subscribe for "domain X changed" notifications.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          EventBus                                       │
//! │                                                                         │
//! │   publish(Inventory)                                                    │
//! │        │                                                                │
//! │        ▼  lock, clone handler list, unlock                              │
//! │   ┌──────────────────────────────────────────────┐                      │
//! │   │ inventory: [#1 handler, #4 handler, ...]     │  registration order │
//! │   │ sales:     [#2 handler]                      │                      │
//! │   │ staff:     []                                │                      │
//! │   └──────────────────────────────────────────────┘                      │
//! │        │                                                                │
//! │        ▼  each call wrapped in catch_unwind                             │
//! │   #1(&event)  ─► panics ─► logged, dispatch continues                   │
//! │   #4(&event)  ─► runs                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers run synchronously on the publisher's thread. Nothing is
//! buffered: a handler subscribed after a publish never sees it. Because the
//! list is snapshotted before dispatch, handlers may subscribe, unsubscribe
//! or publish without deadlocking; such changes apply to later publishes.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use barflow_core::{ChangeEvent, DataDomain};
use tracing::{debug, error, trace};

type Handler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<DataDomain, Vec<(u64, Handler)>>,
}

impl Registry {
    fn remove(&mut self, domain: DataDomain, id: u64) -> bool {
        let Some(list) = self.handlers.get_mut(&domain) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        before != list.len()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A poisoned registry still holds a consistent handler list: handlers
    // never run while the lock is held.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Event Bus
// =============================================================================

/// Injectable change-notification bus. Share it via `Arc<EventBus>`.
#[derive(Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifies every handler currently subscribed to `domain`.
    ///
    /// Returns the number of handlers invoked, including ones that panicked.
    pub fn publish(&self, domain: DataDomain) -> usize {
        let snapshot: Vec<Handler> = {
            let registry = lock(&self.registry);
            registry
                .handlers
                .get(&domain)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        let event = ChangeEvent::new(domain);
        trace!(event = event.topic(), handlers = snapshot.len(), "Publishing change");

        for handler in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                error!(event = event.topic(), "Change handler panicked");
            }
        }

        snapshot.len()
    }

    /// Registers `handler` for `domain`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped. Call [`Subscription::detach`] to keep it for
    /// the lifetime of the bus.
    pub fn subscribe<F>(&self, domain: DataDomain, handler: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(domain)
            .or_default()
            .push((id, Arc::new(handler)));

        debug!(%domain, id, "Subscribed to changes");

        Subscription {
            registry: Arc::downgrade(&self.registry),
            domain,
            id,
            active: true,
        }
    }

    /// Number of handlers subscribed to `domain`.
    pub fn subscriber_count(&self, domain: DataDomain) -> usize {
        lock(&self.registry)
            .handlers
            .get(&domain)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = lock(&self.registry);
        let counts: HashMap<DataDomain, usize> = registry
            .handlers
            .iter()
            .map(|(domain, list)| (*domain, list.len()))
            .collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Registration returned by [`EventBus::subscribe`].
///
/// Dropping it unsubscribes the handler.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    domain: DataDomain,
    id: u64,
    active: bool,
}

impl Subscription {
    /// The domain this handler listens to.
    pub fn domain(&self) -> DataDomain {
        self.domain
    }

    /// Removes the handler. Later publishes no longer reach it; a dispatch
    /// already in progress is unaffected.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keeps the handler registered for as long as the bus lives.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).remove(self.domain, self.id) {
                debug!(domain = %self.domain, id = self.id, "Unsubscribed from changes");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("domain", &self.domain)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn Fn(&ChangeEvent) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = Arc::clone(&log);
        let factory = move |name: &'static str| -> Box<dyn Fn(&ChangeEvent) + Send + Sync> {
            let log = Arc::clone(&log_for_factory);
            Box::new(move |_: &ChangeEvent| log.lock().unwrap().push(name))
        };
        (log, factory)
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        let _a = bus.subscribe(DataDomain::Inventory, handler("a"));
        let _b = bus.subscribe(DataDomain::Inventory, handler("b"));
        let _c = bus.subscribe(DataDomain::Inventory, handler("c"));

        assert_eq!(bus.publish(DataDomain::Inventory), 3);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_domains_are_isolated() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        let _inv = bus.subscribe(DataDomain::Inventory, handler("inventory"));
        let _sales = bus.subscribe(DataDomain::Sales, handler("sales"));

        bus.publish(DataDomain::Sales);
        assert_eq!(*log.lock().unwrap(), vec!["sales"]);
        assert_eq!(bus.publish(DataDomain::Staff), 0);
    }

    #[test]
    fn test_event_carries_domain() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);

        let _sub = bus.subscribe(DataDomain::CashBalance, move |event| {
            *seen_clone.lock().unwrap() = Some(event.topic());
        });

        bus.publish(DataDomain::CashBalance);
        assert_eq!(*seen.lock().unwrap(), Some("cashBalanceChanged"));
    }

    #[test]
    fn test_late_subscriber_misses_earlier_publish() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        bus.publish(DataDomain::Staff);
        let _late = bus.subscribe(DataDomain::Staff, handler("late"));

        assert!(log.lock().unwrap().is_empty());
        bus.publish(DataDomain::Staff);
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        let a = bus.subscribe(DataDomain::Tables, handler("a"));
        let b = bus.subscribe(DataDomain::Tables, handler("b"));
        assert_eq!(bus.subscriber_count(DataDomain::Tables), 2);

        a.unsubscribe();
        drop(b);
        assert_eq!(bus.subscriber_count(DataDomain::Tables), 0);

        assert_eq!(bus.publish(DataDomain::Tables), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detach_keeps_handler() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        bus.subscribe(DataDomain::Settings, handler("detached")).detach();

        bus.publish(DataDomain::Settings);
        assert_eq!(*log.lock().unwrap(), vec!["detached"]);
        assert_eq!(bus.subscriber_count(DataDomain::Settings), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let bus = EventBus::new();
        let (log, handler) = recorder();

        let _first = bus.subscribe(DataDomain::Sales, handler("first"));
        let _boom = bus.subscribe(DataDomain::Sales, |_| panic!("handler failure"));
        let _last = bus.subscribe(DataDomain::Sales, handler("last"));

        assert_eq!(bus.publish(DataDomain::Sales), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "last"]);

        // Bus still usable afterwards
        bus.publish(DataDomain::Sales);
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_unsubscribe_inside_handler_applies_to_later_publishes() {
        let bus = Arc::new(EventBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let calls_clone = Arc::clone(&calls);
        let slot_clone = Arc::clone(&slot);
        let sub = bus.subscribe(DataDomain::Inventory, move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = slot_clone.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        let (log, handler) = recorder();
        let _other = bus.subscribe(DataDomain::Inventory, handler("other"));

        assert_eq!(bus.publish(DataDomain::Inventory), 2);
        assert_eq!(bus.publish(DataDomain::Inventory), 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*log.lock().unwrap(), vec!["other", "other"]);
    }

    #[test]
    fn test_publish_inside_handler() {
        let bus = Arc::new(EventBus::new());
        let (log, handler) = recorder();

        let inner_bus = Arc::clone(&bus);
        let _chain = bus.subscribe(DataDomain::Sales, move |_| {
            inner_bus.publish(DataDomain::CashBalance);
        });
        let _cash = bus.subscribe(DataDomain::CashBalance, handler("cash"));

        bus.publish(DataDomain::Sales);
        assert_eq!(*log.lock().unwrap(), vec!["cash"]);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe(DataDomain::Staff, |_| {});
        drop(bus);
        sub.unsubscribe();
    }
}
