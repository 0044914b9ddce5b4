//! Event processing.
//!
//! - `EventProcessor`: receives parsed events, keeps the latest one per
//!   call connection and kind, resolves pending waits and feeds ongoing
//!   subscriptions

mod event_processor;
mod ongoing;
mod pending;
mod store;

pub use event_processor::{EventProcessor, ProcessorStats, WaitError};
pub use ongoing::OngoingCallback;
pub use pending::EventPredicate;
