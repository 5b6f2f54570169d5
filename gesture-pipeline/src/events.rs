//! Event hub
//!
//! The single notification surface of the library. Consumers subscribe
//! per event category and receive callbacks as frames are processed:
//!
//! - `discrete_result` / `continuous_result` — one callback per nonzero
//!   grouped result (the category implies the gesture kind)
//! - `result_set` — the bounded most-significant shortlists, at most once
//!   per ready window
//! - `tracking_changed` — body tracking identifiers changed
//! - `message` — diagnostics (info or error)
//!
//! Any number of listeners may register for any subset of categories, from
//! any thread. Firing snapshots the handler list before invoking it, so
//! registrations racing an in-flight fan-out never corrupt the delivery
//! iteration. Delivery order across listeners is unspecified.

use crate::types::{Severity, Shortlist, Timestamp, TrackingId};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned by the subscribe methods, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A nonzero grouped gesture result for one body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureResultEvent {
    pub tracking_id: TrackingId,
    /// Raw gesture name or a link's common name
    pub name: String,
    /// Confidence (discrete channel) or progress (continuous channel)
    pub score: f32,
    pub timestamp: Timestamp,
}

/// The most significant gestures of a ready window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSetEvent {
    pub tracking_id: TrackingId,
    /// Top discrete gestures by confidence
    pub confidence: Shortlist,
    /// Top continuous gestures by progress
    pub progress: Shortlist,
    pub timestamp: Timestamp,
}

/// Body tracking identifiers after a tracking update (0 = vacant slot)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingChangedEvent {
    pub tracking_ids: Vec<TrackingId>,
}

/// A diagnostic message for the library user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEvent {
    pub severity: Severity,
    pub text: String,
}

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handler list for one event category
struct Registry<E> {
    handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Registry<E> {
    fn subscribe(
        &self,
        next_id: &AtomicU64,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(handler)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(sub_id, _)| *sub_id != id);
        handlers.len() != before
    }

    fn fire(&self, event: &E) {
        // Snapshot under the lock, call outside it: a handler may subscribe
        // or unsubscribe without deadlocking, and concurrent registration
        // never disturbs this fan-out.
        let snapshot: Vec<Handler<E>> = self.lock().iter().map(|(_, h)| h.clone()).collect();
        for handler in snapshot {
            handler(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Handler<E>)>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The library's notification surface
///
/// Created by the engine, or standalone (`EventHub::new`) when listeners
/// must be in place before collaborators load, so load failures reach them.
#[derive(Default)]
pub struct EventHub {
    next_id: AtomicU64,
    discrete_result: Registry<GestureResultEvent>,
    continuous_result: Registry<GestureResultEvent>,
    result_set: Registry<ResultSetEvent>,
    tracking_changed: Registry<TrackingChangedEvent>,
    message: Registry<MessageEvent>,
}

impl EventHub {
    /// Create a hub with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to nonzero discrete (confidence) results
    pub fn on_discrete_result(
        &self,
        handler: impl Fn(&GestureResultEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.discrete_result.subscribe(&self.next_id, handler)
    }

    /// Subscribe to nonzero continuous (progress) results
    pub fn on_continuous_result(
        &self,
        handler: impl Fn(&GestureResultEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.continuous_result.subscribe(&self.next_id, handler)
    }

    /// Subscribe to per-window most-significant result sets
    pub fn on_result_set(
        &self,
        handler: impl Fn(&ResultSetEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.result_set.subscribe(&self.next_id, handler)
    }

    /// Subscribe to body tracking changes
    pub fn on_tracking_changed(
        &self,
        handler: impl Fn(&TrackingChangedEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.tracking_changed.subscribe(&self.next_id, handler)
    }

    /// Subscribe to diagnostic messages
    pub fn on_message(
        &self,
        handler: impl Fn(&MessageEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.message.subscribe(&self.next_id, handler)
    }

    /// Remove a discrete-result subscription; returns false if unknown
    pub fn off_discrete_result(&self, id: SubscriptionId) -> bool {
        self.discrete_result.unsubscribe(id)
    }

    /// Remove a continuous-result subscription; returns false if unknown
    pub fn off_continuous_result(&self, id: SubscriptionId) -> bool {
        self.continuous_result.unsubscribe(id)
    }

    /// Remove a result-set subscription; returns false if unknown
    pub fn off_result_set(&self, id: SubscriptionId) -> bool {
        self.result_set.unsubscribe(id)
    }

    /// Remove a tracking-changed subscription; returns false if unknown
    pub fn off_tracking_changed(&self, id: SubscriptionId) -> bool {
        self.tracking_changed.unsubscribe(id)
    }

    /// Remove a message subscription; returns false if unknown
    pub fn off_message(&self, id: SubscriptionId) -> bool {
        self.message.unsubscribe(id)
    }

    /// Send a diagnostic to all message listeners
    ///
    /// Public so collaborators (settings loaders, database exporters) can
    /// report their failures over the same channel the pipeline uses.
    pub fn raise_message(&self, severity: Severity, text: impl Into<String>) {
        let event = MessageEvent {
            severity,
            text: text.into(),
        };
        match event.severity {
            Severity::Info => log::info!("{}", event.text),
            Severity::Error => log::warn!("{}", event.text),
        }
        self.message.fire(&event);
    }

    pub(crate) fn raise_discrete_result(&self, event: &GestureResultEvent) {
        self.discrete_result.fire(event);
    }

    pub(crate) fn raise_continuous_result(&self, event: &GestureResultEvent) {
        self.continuous_result.fire(event);
    }

    pub(crate) fn raise_result_set(&self, event: &ResultSetEvent) {
        self.result_set.fire(event);
    }

    pub(crate) fn raise_tracking_changed(&self, event: &TrackingChangedEvent) {
        self.tracking_changed.fire(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_and_fire() {
        let hub = EventHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        hub.on_message(move |e| {
            assert_eq!(e.severity, Severity::Error);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        hub.raise_message(Severity::Error, "boom");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = EventHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        let id = hub.on_message(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        hub.raise_message(Severity::Info, "first");
        assert!(hub.off_message(id));
        assert!(!hub.off_message(id));
        hub.raise_message(Severity::Info, "second");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_categories_are_independent() {
        let hub = EventHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        hub.on_discrete_result(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        hub.raise_message(Severity::Info, "not a result");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribing_from_handler_does_not_deadlock() {
        let hub = Arc::new(EventHub::new());
        let count = Arc::new(AtomicUsize::new(0));

        let inner_hub = hub.clone();
        let seen = count.clone();
        hub.on_message(move |_| {
            let late_seen = seen.clone();
            inner_hub.on_message(move |_| {
                late_seen.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The handler registered mid-fire must not see the firing event
        hub.raise_message(Severity::Info, "first");
        assert_eq!(count.load(Ordering::SeqCst), 0);

        hub.raise_message(Severity::Info, "second");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_from_another_thread() {
        let hub = Arc::new(EventHub::new());
        let count = Arc::new(AtomicUsize::new(0));

        let thread_hub = hub.clone();
        let seen = count.clone();
        std::thread::spawn(move || {
            thread_hub.on_tracking_changed(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        })
        .join()
        .unwrap();

        hub.raise_tracking_changed(&TrackingChangedEvent {
            tracking_ids: vec![7, 0],
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
