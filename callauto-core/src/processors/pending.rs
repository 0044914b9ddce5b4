//! One-shot pending waits.
//!
//! Waits keyed by call connection live in a per-call shard so resolving
//! them only touches that call's entry. Predicate waits have no call key
//! and live in their own map. Every wait is removed under its shard lock
//! by whoever gets there first, the dispatcher or the timing-out waiter, so
//! each wait resolves at most once.

use callauto_sdk::CallAutomationEvent;
use callauto_sdk::objects::EventKind;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc as std_mpsc;
use tokio::sync::oneshot;
use tracing::trace;

/// Arbitrary predicate over events, used for correlation beyond
/// call/kind/context (e.g. matching a transfer target).
pub type EventPredicate = Arc<dyn Fn(&CallAutomationEvent) -> bool + Send + Sync>;

/// What a pending wait is waiting for.
#[derive(Clone)]
pub enum EventMatcher {
    Typed {
        call_connection_id: String,
        kind: EventKind,
        /// When set, the event's operation context must equal this.
        operation_context: Option<String>,
    },
    Predicate(EventPredicate),
}

impl EventMatcher {
    pub fn matches(&self, event: &CallAutomationEvent) -> bool {
        match self {
            EventMatcher::Typed {
                call_connection_id,
                kind,
                operation_context,
            } => {
                event.kind() == *kind
                    && event.call_connection_id() == call_connection_id
                    && operation_context
                        .as_deref()
                        .is_none_or(|ctx| event.operation_context() == Some(ctx))
            }
            EventMatcher::Predicate(predicate) => predicate(event),
        }
    }

    pub fn call_connection_id(&self) -> Option<&str> {
        match self {
            EventMatcher::Typed {
                call_connection_id, ..
            } => Some(call_connection_id),
            EventMatcher::Predicate(_) => None,
        }
    }

    /// Human-readable description for logs and timeout errors.
    pub fn describe(&self) -> String {
        match self {
            EventMatcher::Typed {
                call_connection_id,
                kind,
                operation_context: Some(ctx),
            } => format!("{kind} on {call_connection_id} with context {ctx:?}"),
            EventMatcher::Typed {
                call_connection_id,
                kind,
                operation_context: None,
            } => format!("{kind} on {call_connection_id}"),
            EventMatcher::Predicate(_) => "event matching predicate".to_string(),
        }
    }
}

impl std::fmt::Debug for EventMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Single-fire completion handle of a wait.
pub(crate) enum Completion {
    Async(oneshot::Sender<CallAutomationEvent>),
    /// Capacity-one channel, so sending never blocks.
    Blocking(std_mpsc::SyncSender<CallAutomationEvent>),
}

impl Completion {
    /// Deliver the event. Returns `false` if the waiter is already gone.
    pub(crate) fn complete(self, event: CallAutomationEvent) -> bool {
        match self {
            Completion::Async(tx) => tx.send(event).is_ok(),
            Completion::Blocking(tx) => tx.try_send(event).is_ok(),
        }
    }
}

struct PendingWait {
    id: u64,
    matcher: EventMatcher,
    completion: Completion,
}

/// Locates a registered wait for later removal.
#[derive(Debug)]
pub(crate) struct WaitTicket {
    id: u64,
    call_connection_id: Option<String>,
}

/// Waits registered on one call connection; rarely more than a couple.
type CallWaits = SmallVec<[PendingWait; 2]>;

pub(crate) struct PendingWaits {
    next_id: AtomicU64,
    by_call: DashMap<String, CallWaits>,
    predicates: DashMap<u64, PendingWait>,
}

impl PendingWaits {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            by_call: DashMap::new(),
            predicates: DashMap::new(),
        }
    }

    pub(crate) fn register(&self, matcher: EventMatcher, completion: Completion) -> WaitTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let call_connection_id = matcher.call_connection_id().map(str::to_owned);
        let wait = PendingWait {
            id,
            matcher,
            completion,
        };

        match &call_connection_id {
            Some(call_id) => self.by_call.entry(call_id.clone()).or_default().push(wait),
            None => {
                self.predicates.insert(id, wait);
            }
        }
        trace!(wait_id = id, call_connection_id = ?call_connection_id, "Registered pending wait");

        WaitTicket {
            id,
            call_connection_id,
        }
    }

    /// Remove a wait that has not been resolved yet.
    ///
    /// Returns `false` when the dispatcher already claimed it; its event is
    /// then in flight to the waiter.
    pub(crate) fn deregister(&self, ticket: &WaitTicket) -> bool {
        let removed = match &ticket.call_connection_id {
            Some(call_id) => {
                let removed = match self.by_call.get_mut(call_id) {
                    Some(mut waits) => {
                        let before = waits.len();
                        waits.retain(|w| w.id != ticket.id);
                        waits.len() != before
                    }
                    None => false,
                };
                self.by_call.remove_if(call_id, |_, waits| waits.is_empty());
                removed
            }
            None => self.predicates.remove(&ticket.id).is_some(),
        };
        trace!(wait_id = ticket.id, removed, "Deregistered pending wait");
        removed
    }

    /// Remove and return every wait that `event` satisfies.
    pub(crate) fn take_matching(&self, event: &CallAutomationEvent) -> Vec<Completion> {
        let call_id = event.call_connection_id();
        let mut hits = Vec::new();

        if let Some(mut waits) = self.by_call.get_mut(call_id) {
            let (matched, kept): (CallWaits, CallWaits) = std::mem::take(&mut *waits)
                .into_iter()
                .partition(|w| w.matcher.matches(event));
            *waits = kept;
            hits.extend(matched.into_iter().map(|w| w.completion));
        }
        self.by_call.remove_if(call_id, |_, waits| waits.is_empty());

        if !self.predicates.is_empty() {
            let ids: Vec<u64> = self
                .predicates
                .iter()
                .filter(|entry| entry.value().matcher.matches(event))
                .map(|entry| *entry.key())
                .collect();
            for id in ids {
                if let Some((_, wait)) = self.predicates.remove(&id) {
                    hits.push(wait.completion);
                }
            }
        }

        hits
    }

    /// Drop every wait keyed on `call_connection_id`; their waiters see a
    /// cancellation.
    pub(crate) fn cancel_call(&self, call_connection_id: &str) -> usize {
        self.by_call
            .remove(call_connection_id)
            .map(|(_, waits)| waits.len())
            .unwrap_or(0)
    }

    pub(crate) fn clear(&self) {
        self.by_call.clear();
        self.predicates.clear();
    }

    pub(crate) fn len(&self) -> usize {
        let keyed: usize = self.by_call.iter().map(|entry| entry.value().len()).sum();
        keyed + self.predicates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callauto_sdk::objects::events::{EventBase, PlayCompleted};

    fn play_completed(call_id: &str, ctx: Option<&str>) -> CallAutomationEvent {
        PlayCompleted {
            base: EventBase {
                call_connection_id: call_id.to_string(),
                operation_context: ctx.map(str::to_string),
                ..Default::default()
            },
            result_information: None,
        }
        .into()
    }

    fn typed(call_id: &str, ctx: Option<&str>) -> EventMatcher {
        EventMatcher::Typed {
            call_connection_id: call_id.to_string(),
            kind: EventKind::PlayCompleted,
            operation_context: ctx.map(str::to_string),
        }
    }

    #[test]
    fn test_typed_matcher() {
        let event = play_completed("c1", Some("ctx1"));
        assert!(typed("c1", None).matches(&event));
        assert!(typed("c1", Some("ctx1")).matches(&event));
        assert!(!typed("c1", Some("ctx2")).matches(&event));
        assert!(!typed("c2", None).matches(&event));
    }

    #[test]
    fn test_take_matching_removes_once() {
        let waits = PendingWaits::new();
        let (tx, mut rx) = oneshot::channel();
        waits.register(typed("c1", None), Completion::Async(tx));
        assert_eq!(waits.len(), 1);

        let event = play_completed("c1", None);
        let hits = waits.take_matching(&event);
        assert_eq!(hits.len(), 1);
        assert_eq!(waits.len(), 0);
        assert!(waits.take_matching(&event).is_empty());

        for hit in hits {
            assert!(hit.complete(event.clone()));
        }
        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn test_take_matching_keeps_unmatched_waits() {
        let waits = PendingWaits::new();
        let (tx_a, mut rx_a) = oneshot::channel();
        let (tx_b, mut rx_b) = oneshot::channel();
        let (tx_c, _rx_c) = oneshot::channel();
        waits.register(typed("c1", Some("a")), Completion::Async(tx_a));
        waits.register(typed("c1", Some("b")), Completion::Async(tx_b));
        let kept = waits.register(typed("c1", Some("c")), Completion::Async(tx_c));

        let event = play_completed("c1", Some("b"));
        let hits = waits.take_matching(&event);
        assert_eq!(hits.len(), 1);
        for hit in hits {
            assert!(hit.complete(event.clone()));
        }
        assert_eq!(rx_b.try_recv().unwrap(), event);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(waits.len(), 2);
        assert!(waits.deregister(&kept));
        assert_eq!(waits.len(), 1);
    }

    #[test]
    fn test_deregister_after_claim_reports_false() {
        let waits = PendingWaits::new();
        let (tx, _rx) = oneshot::channel();
        let ticket = waits.register(typed("c1", None), Completion::Async(tx));
        let _ = waits.take_matching(&play_completed("c1", None));
        assert!(!waits.deregister(&ticket));
    }

    #[test]
    fn test_predicate_waits() {
        let waits = PendingWaits::new();
        let (tx, _rx) = std_mpsc::sync_channel(1);
        let predicate: EventPredicate =
            Arc::new(|e: &CallAutomationEvent| e.operation_context() == Some("wanted"));
        let ticket = waits.register(EventMatcher::Predicate(predicate), Completion::Blocking(tx));

        assert!(waits.take_matching(&play_completed("c1", Some("other"))).is_empty());
        assert_eq!(waits.len(), 1);
        assert!(waits.deregister(&ticket));
        assert_eq!(waits.len(), 0);
    }

    #[test]
    fn test_cancel_call_drops_senders() {
        let waits = PendingWaits::new();
        let (tx, mut rx) = oneshot::channel();
        waits.register(typed("c1", None), Completion::Async(tx));
        assert_eq!(waits.cancel_call("c1"), 1);
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
    }
}
