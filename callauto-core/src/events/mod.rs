//! Event plumbing for the processor.
//!
//! The event types themselves come from `callauto-sdk`; this module adds
//! the channel infrastructure used to feed the processor and to hand
//! events to subscribers.

pub mod channels;

pub use channels::{
    call_event_channel, event_batch_channel, CallEventReceiver, CallEventSender,
    EventBatchReceiver, EventBatchSender, DEFAULT_CHANNEL_BUFFER,
};

pub use callauto_sdk::objects::{CallAutomationEvent, EventKind, TypedEvent};
