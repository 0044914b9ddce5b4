//! Persistent per-(call, kind) callbacks.

use callauto_sdk::CallAutomationEvent;
use callauto_sdk::objects::EventKind;
use dashmap::DashMap;
use std::sync::Arc;

/// Callback invoked for every matching event until detached.
pub type OngoingCallback = Arc<dyn Fn(CallAutomationEvent) + Send + Sync>;

pub(crate) struct OngoingSubscriptions {
    callbacks: DashMap<(String, EventKind), OngoingCallback>,
}

impl OngoingSubscriptions {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: DashMap::new(),
        }
    }

    /// Attach `callback`. Returns `true` if it replaced an existing one.
    pub(crate) fn attach(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        callback: OngoingCallback,
    ) -> bool {
        self.callbacks
            .insert((call_connection_id.to_owned(), kind), callback)
            .is_some()
    }

    pub(crate) fn detach(&self, call_connection_id: &str, kind: EventKind) -> bool {
        self.callbacks
            .remove(&(call_connection_id.to_owned(), kind))
            .is_some()
    }

    /// Clone out the callback for `event`, if any. The map lock is released
    /// before the caller invokes it.
    pub(crate) fn callback_for(&self, event: &CallAutomationEvent) -> Option<OngoingCallback> {
        self.callbacks
            .get(&(event.call_connection_id().to_owned(), event.kind()))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn forget(&self, call_connection_id: &str) -> usize {
        let before = self.callbacks.len();
        self.callbacks
            .retain(|(call_id, _), _| call_id != call_connection_id);
        before.saturating_sub(self.callbacks.len())
    }

    pub(crate) fn clear(&self) {
        self.callbacks.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}
