//! CloudEvent payload parsing.
//!
//! The service delivers notifications as a JSON array of CloudEvent
//! envelopes, though a bare envelope object is accepted too. Parsing follows
//! three rules:
//!
//! * Unparseable top-level JSON is an error for the whole payload.
//! * Elements that are not envelopes, or whose `type` is not in the
//!   catalog, are skipped. The service adds event types over time and older
//!   clients must keep working.
//! * An element with a known `type` but malformed `data` is an error; a
//!   half-populated event is never produced.
//!
//! Output order matches input order.

use serde::de::Error as _;
use serde_json::Value;
use tracing::{debug, warn};

use crate::objects::envelope::CloudEventEnvelope;
use crate::objects::events::{CallAutomationEvent, EventKind};

/// Errors produced while parsing a notification payload.
#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a cloud event object or array, found {found}")]
    UnexpectedShape { found: &'static str },
    #[error("invalid data for {event_type}: {source}")]
    InvalidEventData {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a UTF-8 JSON payload into events.
pub fn parse_events(payload: &str) -> Result<Vec<CallAutomationEvent>, EventParseError> {
    let value: Value = serde_json::from_str(payload)?;
    parse_events_value(value)
}

/// Parse a raw request body into events.
pub fn parse_events_slice(payload: &[u8]) -> Result<Vec<CallAutomationEvent>, EventParseError> {
    let value: Value = serde_json::from_slice(payload)?;
    parse_events_value(value)
}

/// Parse an already-decoded JSON value (object or array) into events.
pub fn parse_events_value(value: Value) -> Result<Vec<CallAutomationEvent>, EventParseError> {
    match value {
        Value::Array(elements) => {
            let mut events = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                if let Some(event) = parse_element(index, element)? {
                    events.push(event);
                }
            }
            Ok(events)
        }
        element @ Value::Object(_) => Ok(parse_element(0, element)?.into_iter().collect()),
        other => Err(EventParseError::UnexpectedShape {
            found: json_type_name(&other),
        }),
    }
}

/// Parse a payload expected to hold a single event.
///
/// Returns the first event, or `None` if every element was skipped.
pub fn parse_event(payload: &str) -> Result<Option<CallAutomationEvent>, EventParseError> {
    Ok(parse_events(payload)?.into_iter().next())
}

/// Decode one envelope.
///
/// `Ok(None)` means the discriminator is not in the catalog.
pub fn parse_envelope(
    envelope: CloudEventEnvelope,
) -> Result<Option<CallAutomationEvent>, EventParseError> {
    let Some(kind) = EventKind::from_event_type(&envelope.event_type) else {
        debug!(
            event_type = %envelope.event_type,
            id = %envelope.id,
            "Skipping unrecognized event type"
        );
        return Ok(None);
    };

    let invalid = |source: serde_json::Error| EventParseError::InvalidEventData {
        event_type: kind.as_str(),
        source,
    };

    let data = match envelope.data {
        // Some deliveries carry `data` as a JSON-encoded string.
        Some(Value::String(encoded)) => serde_json::from_str(&encoded).map_err(invalid)?,
        Some(data) => data,
        None => Value::Null,
    };

    let event = CallAutomationEvent::from_data(kind, data).map_err(invalid)?;
    if event.call_connection_id().is_empty() {
        return Err(invalid(serde_json::Error::custom(
            "callConnectionId is empty",
        )));
    }

    debug!(
        event = %kind,
        call_connection_id = %event.call_connection_id(),
        operation_context = ?event.operation_context(),
        "Parsed event"
    );
    Ok(Some(event))
}

fn parse_element(index: usize, element: Value) -> Result<Option<CallAutomationEvent>, EventParseError> {
    if !element.is_object() {
        warn!(
            index,
            found = json_type_name(&element),
            "Skipping non-object cloud event element"
        );
        return Ok(None);
    }

    let envelope: CloudEventEnvelope = match serde_json::from_value(element) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(index, error = %e, "Skipping malformed cloud event envelope");
            return Ok(None);
        }
    };

    parse_envelope(envelope)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
