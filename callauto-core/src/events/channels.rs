//! Event channel factories and handles.
//!
//! Call event channels back `subscribe`: the processor holds the sender and
//! forwards every matching event into it. Batch channels carry parsed
//! webhook deliveries into the processor's run loop.

use callauto_sdk::CallAutomationEvent;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for call automation events.
pub type CallEventSender = mpsc::Sender<CallAutomationEvent>;
/// Receiver handle for call automation events.
pub type CallEventReceiver = mpsc::Receiver<CallAutomationEvent>;

/// Create a new call event channel with the given capacity.
///
/// Returns a (sender, receiver) pair. A capacity of zero is bumped to one.
pub fn call_event_channel(capacity: usize) -> (CallEventSender, CallEventReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Sender handle for parsed webhook batches.
pub type EventBatchSender = mpsc::Sender<Vec<CallAutomationEvent>>;
/// Receiver handle for parsed webhook batches.
pub type EventBatchReceiver = mpsc::Receiver<Vec<CallAutomationEvent>>;

/// Create a new batch channel feeding [`EventProcessor::run`](crate::processors::EventProcessor::run).
///
/// Returns a (sender, receiver) pair.
pub fn event_batch_channel() -> (EventBatchSender, EventBatchReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
