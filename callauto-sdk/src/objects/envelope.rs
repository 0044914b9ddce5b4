//! CloudEvents envelope wrapping every Call Automation notification.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One CloudEvents 1.0 envelope.
///
/// `data` is kept opaque here. Its concrete shape is chosen by `event_type`
/// and decoded by [`crate::parser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEventEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    /// Discriminator, e.g. `Microsoft.Communication.CallConnected`.
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "super::timestamp::deserialize",
        serialize_with = "time::serde::rfc3339::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<OffsetDateTime>,
    #[serde(default = "default_specversion")]
    pub specversion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

fn default_specversion() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_fields() {
        let json = r#"{
            "id": "704a7a96-4d74-4ebe-9cd0-b7cc39c3d7b1",
            "source": "calling/callConnections/401f3500-62bd-46a9-8c09-9e1b06caca01",
            "type": "Microsoft.Communication.CallConnected",
            "data": {"callConnectionId": "401f3500-62bd-46a9-8c09-9e1b06caca01"},
            "time": "2023-03-22T16:57:09.287755+00:00",
            "specversion": "1.0",
            "datacontenttype": "application/json",
            "subject": "calling/callConnections/401f3500-62bd-46a9-8c09-9e1b06caca01"
        }"#;
        let envelope: CloudEventEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.event_type, "Microsoft.Communication.CallConnected");
        assert_eq!(envelope.datacontenttype.as_deref(), Some("application/json"));
        assert_eq!(envelope.time.map(|t| t.year()), Some(2023));
        assert!(envelope.data.is_some());
    }

    #[test]
    fn test_envelope_round_trip_keeps_wire_names() {
        let envelope = CloudEventEnvelope {
            id: "1".to_string(),
            source: "calling".to_string(),
            event_type: "Microsoft.Communication.PlayCompleted".to_string(),
            data: None,
            time: None,
            specversion: "1.0".to_string(),
            datacontenttype: None,
            subject: None,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "Microsoft.Communication.PlayCompleted");
        assert_eq!(value["specversion"], "1.0");
        assert!(value.get("data").is_none());
    }
}
