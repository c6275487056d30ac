//! Change notifications and the subscriber hub.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cure::GlobalState;
use crate::outcome::Outcome;
use crate::province::ProvinceSnapshot;

/// Notification emitted by the engine. Payloads are read-only snapshots;
/// handlers must not call back into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    ProvinceChanged { province: ProvinceSnapshot },
    GlobalChanged { global: GlobalState },
    /// One-shot: every province crossed the fully-infected threshold.
    AllProvincesInfected,
    /// One-shot: cure progress reached the completion threshold.
    CureCompleted,
    /// One-shot: the session was decided.
    OutcomeReached { outcome: Outcome },
}

/// Handle returned by [`EventHub::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SimEvent)>;

/// Single subscriber registry delivering every event to every listener, in
/// subscription order.
#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns true when a matching subscription was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &SimEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut hub = EventHub::new();
        hub.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        hub.emit(&SimEvent::AllProvincesInfected);
        hub.emit(&SimEvent::CureCompleted);

        let events = seen.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SimEvent::AllProvincesInfected);
        assert_eq!(events[1], SimEvent::CureCompleted);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0_u32));
        let sink = Rc::clone(&count);
        let mut hub = EventHub::new();
        let id = hub.subscribe(move |_| *sink.borrow_mut() += 1);

        hub.emit(&SimEvent::CureCompleted);
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.emit(&SimEvent::CureCompleted);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn events_serialize_with_kind_tags() {
        let json = serde_json::to_string(&SimEvent::GlobalChanged {
            global: GlobalState::default(),
        })
        .unwrap();
        assert!(json.contains("\"kind\":\"global_changed\""));
    }
}
