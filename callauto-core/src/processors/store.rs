//! Latest event per call connection and kind.
//!
//! Entries are never evicted on their own; callers drop finished calls with
//! [`EventStore::forget`].

use callauto_sdk::CallAutomationEvent;
use callauto_sdk::objects::EventKind;
use dashmap::DashMap;
use std::collections::HashMap;

use super::pending::EventMatcher;

pub(crate) struct EventStore {
    events: DashMap<String, HashMap<EventKind, CallAutomationEvent>>,
}

impl EventStore {
    pub(crate) fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }

    /// Record `event`, replacing any earlier event of the same kind on the
    /// same call.
    pub(crate) fn upsert(&self, event: &CallAutomationEvent) {
        self.events
            .entry(event.call_connection_id().to_owned())
            .or_default()
            .insert(event.kind(), event.clone());
    }

    pub(crate) fn get(&self, call_connection_id: &str, kind: EventKind) -> Option<CallAutomationEvent> {
        self.events
            .get(call_connection_id)
            .and_then(|kinds| kinds.get(&kind).cloned())
    }

    /// Find a stored event that already satisfies `matcher`.
    pub(crate) fn find(&self, matcher: &EventMatcher) -> Option<CallAutomationEvent> {
        match matcher {
            EventMatcher::Typed {
                call_connection_id,
                kind,
                ..
            } => self
                .get(call_connection_id, *kind)
                .filter(|event| matcher.matches(event)),
            EventMatcher::Predicate(predicate) => self.events.iter().find_map(|entry| {
                entry.value().values().find(|event| predicate(event)).cloned()
            }),
        }
    }

    pub(crate) fn forget(&self, call_connection_id: &str) -> bool {
        self.events.remove(call_connection_id).is_some()
    }

    pub(crate) fn clear(&self) {
        self.events.clear();
    }

    /// Number of call connections with at least one stored event.
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}
