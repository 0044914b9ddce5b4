//! Recording state events.

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingState {
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

/// Which recording pipeline produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingKind {
    AzureCommunicationServices,
    Teams,
    TeamsCompliance,
    #[serde(other)]
    Unknown,
}

/// The three recording-state events share one shape.
macro_rules! recording_state_event {
    ($(#[$meta:meta])* $name:ident) => {
        event_payload! {
            $(#[$meta])*
            $name {
                recording_id: Option<String>,
                state: Option<RecordingState>,
                #[serde(deserialize_with = "crate::objects::timestamp::deserialize")]
                start_date_time: Option<OffsetDateTime>,
                recording_kind: Option<RecordingKind>,
            }
        }
    };
}

recording_state_event! {
    RecordingStateChanged
}

recording_state_event! {
    /// Recording state of a Teams interop call.
    TeamsRecordingStateChanged
}

recording_state_event! {
    /// Recording state driven by a Teams compliance recording policy.
    TeamsComplianceRecordingStateChanged
}

event_payload! {
    StartRecordingFailed {
        recording_id: Option<String>,
    }
}
