//! EventProcessor.
//!
//! The EventProcessor is responsible for:
//! - Recording the latest event of each kind per call connection
//! - Resolving one-shot waits (typed or predicate) as matching events arrive
//! - Invoking ongoing subscriptions for every matching event
//!
//! Waits register first and then consult the store, so an event that
//! arrived before the wait was set up still resolves it immediately.

use crate::config::{ConfigError, EventProcessorConfig, OngoingDispatch};
use crate::events::{call_event_channel, CallEventReceiver, EventBatchReceiver};
use callauto_sdk::objects::{EventKind, TypedEvent};
use callauto_sdk::parser::{parse_events_slice, EventParseError};
use callauto_sdk::CallAutomationEvent;
use kanau::processor::Processor;
use std::convert::Infallible;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

use super::ongoing::{OngoingCallback, OngoingSubscriptions};
use super::pending::{Completion, EventMatcher, EventPredicate, PendingWaits, WaitTicket};
use super::store::EventStore;

/// Errors returned by the wait operations.
#[derive(Debug, Error)]
pub enum WaitError {
    /// No matching event arrived in time. The registration has been removed.
    #[error("timed out after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout { waiting_for: String, timeout_ms: u64 },

    /// The wait was dropped by `forget_call_connection` or `clear`.
    #[error("wait cancelled")]
    Cancelled,

    /// A typed wait received a different payload type.
    #[error("expected {expected} event, got {actual}")]
    UnexpectedKind {
        expected: EventKind,
        actual: EventKind,
    },
}

/// Counts of live entries, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessorStats {
    /// Call connections with at least one stored event.
    pub call_connections: usize,
    pub pending_waits: usize,
    pub ongoing_subscriptions: usize,
}

struct ProcessorInner {
    config: EventProcessorConfig,
    store: EventStore,
    pending: PendingWaits,
    ongoing: OngoingSubscriptions,
}

/// Correlates inbound Call Automation events with the code waiting on them.
///
/// Cheap to clone; clones share state. Stored events and ongoing
/// subscriptions are kept until removed with
/// [`forget_call_connection`](Self::forget_call_connection),
/// [`detach_ongoing_event_processor`](Self::detach_ongoing_event_processor)
/// or [`clear`](Self::clear), so long-running services must release
/// finished calls themselves.
///
/// Wait predicates are evaluated while a map shard is read-locked and must
/// not call back into the processor. Ongoing callbacks run without any lock
/// held and may.
#[derive(Clone)]
pub struct EventProcessor {
    inner: Arc<ProcessorInner>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self::new(EventProcessorConfig::default())
    }
}

impl std::fmt::Debug for EventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Outcome of registering a wait.
enum Registration {
    /// A stored event already satisfied the wait; nothing is registered.
    Resolved(CallAutomationEvent),
    Pending(WaitTicket),
}

/// Deregisters an async wait if its future is dropped before completion.
struct WaitGuard<'a> {
    pending: &'a PendingWaits,
    ticket: Option<WaitTicket>,
}

impl WaitGuard<'_> {
    /// Deregister now. `false` means the dispatcher claimed the wait first.
    fn release(&mut self) -> bool {
        self.ticket
            .take()
            .is_some_and(|ticket| self.pending.deregister(&ticket))
    }

    /// The wait was resolved or dropped by the processor; nothing to undo.
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.pending.deregister(&ticket);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

impl EventProcessor {
    /// Create a new EventProcessor.
    ///
    /// Zero values in `config` fall back to their defaults; use
    /// [`try_new`](Self::try_new) to reject them instead.
    pub fn new(config: EventProcessorConfig) -> Self {
        Self::with_config(config.sanitized())
    }

    /// Create a new EventProcessor from a validated config.
    pub fn try_new(config: EventProcessorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: EventProcessorConfig) -> Self {
        Self {
            inner: Arc::new(ProcessorInner {
                config,
                store: EventStore::new(),
                pending: PendingWaits::new(),
                ongoing: OngoingSubscriptions::new(),
            }),
        }
    }

    pub fn config(&self) -> &EventProcessorConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Process events in order. Returns how many were processed.
    pub fn process_events<I>(&self, events: I) -> usize
    where
        I: IntoIterator<Item = CallAutomationEvent>,
    {
        let mut processed = 0;
        for event in events {
            self.process_event(event);
            processed += 1;
        }
        processed
    }

    /// Store one event, resolve the waits it satisfies, then notify its
    /// ongoing subscription.
    pub fn process_event(&self, event: CallAutomationEvent) {
        let inner = &self.inner;
        debug!(
            call_connection_id = %event.call_connection_id(),
            event = %event.kind(),
            operation_context = ?event.operation_context(),
            "Processing event"
        );

        inner.store.upsert(&event);

        let hits = inner.pending.take_matching(&event);
        if !hits.is_empty() {
            debug!(
                call_connection_id = %event.call_connection_id(),
                event = %event.kind(),
                resolved = hits.len(),
                "Resolved pending waits"
            );
        }
        for completion in hits {
            if !completion.complete(event.clone()) {
                trace!(event = %event.kind(), "Waiter went away before delivery");
            }
        }

        if let Some(callback) = inner.ongoing.callback_for(&event) {
            callback(event);
        }
    }

    /// Parse a raw webhook body and process its events.
    ///
    /// Parse errors are returned before any event is processed.
    pub fn process_payload(&self, payload: impl AsRef<[u8]>) -> Result<usize, EventParseError> {
        let events = parse_events_slice(payload.as_ref())?;
        Ok(self.process_events(events))
    }

    /// Run the processor as a pipeline stage fed by a batch channel.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut batch_rx: EventBatchReceiver,
    ) {
        info!("EventProcessor started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("EventProcessor received shutdown signal");
                        break;
                    }
                }

                Some(batch) = batch_rx.recv() => {
                    let processed = self.process_events(batch);
                    debug!(processed, "Processed event batch");
                }

                else => {
                    info!("Event batch channel closed");
                    break;
                }
            }
        }

        info!("EventProcessor shutdown complete");
    }

    // -----------------------------------------------------------------------
    // One-shot waits
    // -----------------------------------------------------------------------

    /// Register a wait, then check the store for an event that already
    /// satisfies it.
    fn register(&self, matcher: &EventMatcher, completion: Completion) -> Registration {
        let inner = &self.inner;
        let ticket = inner.pending.register(matcher.clone(), completion);

        if let Some(stored) = inner.store.find(matcher) {
            if inner.pending.deregister(&ticket) {
                debug!(waiting_for = %matcher.describe(), "Wait satisfied by stored event");
                return Registration::Resolved(stored);
            }
            // Claimed by the dispatcher in between; its event is in flight.
        }
        Registration::Pending(ticket)
    }

    async fn wait(
        &self,
        matcher: EventMatcher,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        let (tx, mut rx) = oneshot::channel();
        let ticket = match self.register(&matcher, Completion::Async(tx)) {
            Registration::Resolved(event) => return Ok(event),
            Registration::Pending(ticket) => ticket,
        };
        let mut guard = WaitGuard {
            pending: &self.inner.pending,
            ticket: Some(ticket),
        };

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(event)) => {
                guard.disarm();
                Ok(event)
            }
            Ok(Err(_)) => {
                guard.disarm();
                Err(WaitError::Cancelled)
            }
            Err(_) => {
                if guard.release() {
                    debug!(waiting_for = %matcher.describe(), "Wait timed out");
                    Err(WaitError::Timeout {
                        waiting_for: matcher.describe(),
                        timeout_ms: duration_ms(timeout),
                    })
                } else {
                    rx.await.map_err(|_| WaitError::Cancelled)
                }
            }
        }
    }

    fn blocking_wait(
        &self,
        matcher: EventMatcher,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        let (tx, rx) = std_mpsc::sync_channel(1);
        let ticket = match self.register(&matcher, Completion::Blocking(tx)) {
            Registration::Resolved(event) => return Ok(event),
            Registration::Pending(ticket) => ticket,
        };

        match rx.recv_timeout(timeout) {
            Ok(event) => Ok(event),
            Err(std_mpsc::RecvTimeoutError::Disconnected) => Err(WaitError::Cancelled),
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                if self.inner.pending.deregister(&ticket) {
                    debug!(waiting_for = %matcher.describe(), "Blocking wait timed out");
                    Err(WaitError::Timeout {
                        waiting_for: matcher.describe(),
                        timeout_ms: duration_ms(timeout),
                    })
                } else {
                    rx.recv().map_err(|_| WaitError::Cancelled)
                }
            }
        }
    }

    fn typed_matcher(
        call_connection_id: &str,
        kind: EventKind,
        operation_context: Option<&str>,
    ) -> EventMatcher {
        EventMatcher::Typed {
            call_connection_id: call_connection_id.to_owned(),
            kind,
            operation_context: operation_context.map(str::to_owned),
        }
    }

    /// Wait for the next (or already stored) event of `kind` on a call.
    pub async fn wait_for_event(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        self.wait(Self::typed_matcher(call_connection_id, kind, None), timeout)
            .await
    }

    /// Like [`wait_for_event`](Self::wait_for_event), but only an event
    /// echoing `operation_context` satisfies the wait.
    pub async fn wait_for_event_with_context(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        operation_context: &str,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        self.wait(
            Self::typed_matcher(call_connection_id, kind, Some(operation_context)),
            timeout,
        )
        .await
    }

    /// Wait for any event accepted by `predicate`, on any call connection.
    pub async fn wait_for_event_matching<F>(
        &self,
        predicate: F,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError>
    where
        F: Fn(&CallAutomationEvent) -> bool + Send + Sync + 'static,
    {
        let predicate: EventPredicate = Arc::new(predicate);
        self.wait(EventMatcher::Predicate(predicate), timeout).await
    }

    /// Typed wait using the configured default timeout.
    pub async fn wait_for<T: TypedEvent>(
        &self,
        call_connection_id: &str,
        operation_context: Option<&str>,
    ) -> Result<T, WaitError> {
        let matcher = Self::typed_matcher(call_connection_id, T::KIND, operation_context);
        let event = self.wait(matcher, self.inner.config.default_timeout()).await?;
        let actual = event.kind();
        T::from_event(event).ok_or(WaitError::UnexpectedKind {
            expected: T::KIND,
            actual,
        })
    }

    /// Blocking form of [`wait_for_event`](Self::wait_for_event).
    ///
    /// Parks the calling thread; do not call it from an async task.
    pub fn blocking_wait_for_event(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        self.blocking_wait(Self::typed_matcher(call_connection_id, kind, None), timeout)
    }

    /// Blocking form of
    /// [`wait_for_event_with_context`](Self::wait_for_event_with_context).
    pub fn blocking_wait_for_event_with_context(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        operation_context: &str,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError> {
        self.blocking_wait(
            Self::typed_matcher(call_connection_id, kind, Some(operation_context)),
            timeout,
        )
    }

    /// Blocking form of
    /// [`wait_for_event_matching`](Self::wait_for_event_matching).
    pub fn blocking_wait_for_event_matching<F>(
        &self,
        predicate: F,
        timeout: Duration,
    ) -> Result<CallAutomationEvent, WaitError>
    where
        F: Fn(&CallAutomationEvent) -> bool + Send + Sync + 'static,
    {
        let predicate: EventPredicate = Arc::new(predicate);
        self.blocking_wait(EventMatcher::Predicate(predicate), timeout)
    }

    // -----------------------------------------------------------------------
    // Ongoing subscriptions
    // -----------------------------------------------------------------------

    /// Invoke `callback` for every event of `kind` on the call until
    /// detached. Replaces any callback already attached for the same pair.
    pub fn attach_ongoing_event_processor<F>(
        &self,
        call_connection_id: &str,
        kind: EventKind,
        callback: F,
    ) where
        F: Fn(CallAutomationEvent) + Send + Sync + 'static,
    {
        let callback: OngoingCallback = match self.inner.config.ongoing_dispatch {
            OngoingDispatch::Inline => Arc::new(callback),
            OngoingDispatch::Spawn => Self::spawn_ordered(call_connection_id, kind, callback),
        };
        let replaced = self.inner.ongoing.attach(call_connection_id, kind, callback);
        info!(
            call_connection_id = %call_connection_id,
            event = %kind,
            replaced,
            "Attached ongoing event processor"
        );
    }

    /// Move `callback` onto its own task on the current runtime, fed through
    /// a queue so it sees events in processing order. The task ends when the
    /// returned forwarder is dropped by detach, replace or forget.
    fn spawn_ordered<F>(call_connection_id: &str, kind: EventKind, callback: F) -> OngoingCallback
    where
        F: Fn(CallAutomationEvent) + Send + Sync + 'static,
    {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    call_connection_id = %call_connection_id,
                    event = %kind,
                    "No tokio runtime for ongoing dispatch, invoking inline"
                );
                return Arc::new(callback);
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<CallAutomationEvent>();
        handle.spawn(async move {
            while let Some(event) = rx.recv().await {
                callback(event);
            }
        });
        Arc::new(move |event: CallAutomationEvent| {
            if let Err(mpsc::error::SendError(event)) = tx.send(event) {
                trace!(event = %event.kind(), "Ongoing dispatch task gone, dropping event");
            }
        })
    }

    /// Remove the subscription for the pair. No-op when none is attached.
    pub fn detach_ongoing_event_processor(&self, call_connection_id: &str, kind: EventKind) {
        if self.inner.ongoing.detach(call_connection_id, kind) {
            info!(
                call_connection_id = %call_connection_id,
                event = %kind,
                "Detached ongoing event processor"
            );
        }
    }

    /// Channel flavour of an ongoing subscription.
    ///
    /// The channel holds up to `channel_capacity` events; further events are
    /// dropped while the receiver lags. Detaching the pair closes it.
    pub fn subscribe(&self, call_connection_id: &str, kind: EventKind) -> CallEventReceiver {
        let (tx, rx) = call_event_channel(self.inner.config.channel_capacity);
        self.attach_ongoing_event_processor(call_connection_id, kind, move |event| {
            match tx.try_send(event) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(event)) => {
                    warn!(
                        call_connection_id = %event.call_connection_id(),
                        event = %event.kind(),
                        "Subscriber lagging, dropping event"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(event)) => {
                    trace!(
                        call_connection_id = %event.call_connection_id(),
                        event = %event.kind(),
                        "Subscriber gone, dropping event"
                    );
                }
            }
        });
        rx
    }

    // -----------------------------------------------------------------------
    // Store and lifetime
    // -----------------------------------------------------------------------

    /// Latest stored event of `kind` on the call.
    pub fn latest_event(&self, call_connection_id: &str, kind: EventKind) -> Option<CallAutomationEvent> {
        self.inner.store.get(call_connection_id, kind)
    }

    /// Drop everything held for a call connection. Its pending waits fail
    /// with [`WaitError::Cancelled`].
    pub fn forget_call_connection(&self, call_connection_id: &str) {
        let inner = &self.inner;
        let had_events = inner.store.forget(call_connection_id);
        let cancelled = inner.pending.cancel_call(call_connection_id);
        let detached = inner.ongoing.forget(call_connection_id);
        info!(
            call_connection_id = %call_connection_id,
            had_events,
            cancelled,
            detached,
            "Forgot call connection"
        );
    }

    /// Drop all state. Every pending wait fails with
    /// [`WaitError::Cancelled`].
    pub fn clear(&self) {
        let inner = &self.inner;
        inner.store.clear();
        inner.pending.clear();
        inner.ongoing.clear();
        info!("Cleared event processor state");
    }

    pub fn stats(&self) -> ProcessorStats {
        let inner = &self.inner;
        ProcessorStats {
            call_connections: inner.store.len(),
            pending_waits: inner.pending.len(),
            ongoing_subscriptions: inner.ongoing.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Processor trait implementation
// ---------------------------------------------------------------------------

impl Processor<Vec<CallAutomationEvent>> for EventProcessor {
    type Output = usize;
    type Error = Infallible;

    async fn process(&self, events: Vec<CallAutomationEvent>) -> Result<usize, Infallible> {
        Ok(self.process_events(events))
    }
}
