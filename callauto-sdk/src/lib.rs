//! Wire types and parser for Azure Communication Services Call Automation
//! notifications.
//!
//! The service reports the progress of call-control operations through
//! CloudEvent webhooks. This crate decodes those payloads into a closed set
//! of typed [`CallAutomationEvent`]s; correlating them with the code waiting
//! on them is the job of the processing crate built on top.
//!
//! ```rust
//! use callauto_sdk::parser::parse_events;
//! use callauto_sdk::objects::EventKind;
//!
//! let body = r#"[{
//!     "id": "1",
//!     "source": "calling/callConnections/abc",
//!     "type": "Microsoft.Communication.CallConnected",
//!     "data": {"callConnectionId": "abc"},
//!     "specversion": "1.0"
//! }]"#;
//!
//! let events = parse_events(body).unwrap();
//! assert_eq!(events[0].kind(), EventKind::CallConnected);
//! ```

pub mod objects;
pub mod parser;

pub use objects::{CallAutomationEvent, EventKind, TypedEvent};
pub use parser::EventParseError;
