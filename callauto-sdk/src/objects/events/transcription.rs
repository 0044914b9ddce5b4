//! Live transcription status events.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TranscriptionStatus {
    TranscriptionStarted,
    TranscriptionFailed,
    TranscriptionResumed,
    TranscriptionUpdated,
    TranscriptionStopped,
    UnspecifiedError,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionUpdate {
    #[serde(default)]
    pub transcription_status: Option<TranscriptionStatus>,
    /// Free-form detail such as `subscriptionStarted` or `streamConnectionInterrupted`.
    #[serde(default)]
    pub transcription_status_details: Option<String>,
}

macro_rules! transcription_event {
    ($name:ident) => {
        event_payload! {
            $name {
                transcription_update: Option<TranscriptionUpdate>,
            }
        }
    };
}

transcription_event!(TranscriptionStarted);
transcription_event!(TranscriptionStopped);
transcription_event!(TranscriptionResumed);
transcription_event!(TranscriptionUpdated);
transcription_event!(TranscriptionFailed);
