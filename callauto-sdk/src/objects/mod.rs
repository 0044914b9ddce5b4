//! Wire types shared by everything that handles Call Automation
//! notifications.

pub mod envelope;
pub mod events;
pub mod identifier;
pub mod reason_code;
mod timestamp;

pub use envelope::CloudEventEnvelope;
pub use events::{CallAutomationEvent, EventBase, EventKind, TypedEvent};
pub use identifier::CommunicationIdentifier;
pub use reason_code::{
    OperationFamily, PlayReason, ReasonCode, RecognizeReason, ResultInformation,
};
