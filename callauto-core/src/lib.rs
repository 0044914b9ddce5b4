#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Correlation of Call Automation events with the code waiting on them.
//!
//! Feed webhook deliveries into an [`EventProcessor`] and await the events
//! an operation is expected to produce:
//!
//! ```rust
//! use callauto_core::processors::EventProcessor;
//! use callauto_core::events::EventKind;
//! use std::time::Duration;
//!
//! # async fn demo(body: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let processor = EventProcessor::default();
//! processor.process_payload(body)?;
//! let connected = processor
//!     .wait_for_event("call-1", EventKind::CallConnected, Duration::from_secs(30))
//!     .await?;
//! println!("{}", connected.kind());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod events;
pub mod processors;

pub use processors::EventProcessor;
