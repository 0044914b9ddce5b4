//! Media streaming status events.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaStreamingStatus {
    MediaStreamingStarted,
    MediaStreamingFailed,
    MediaStreamingStopped,
    UnspecifiedError,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamingUpdate {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub media_streaming_status: Option<MediaStreamingStatus>,
    #[serde(default)]
    pub media_streaming_status_details: Option<String>,
}

event_payload! {
    MediaStreamingStarted {
        media_streaming_update: Option<MediaStreamingUpdate>,
    }
}

event_payload! {
    MediaStreamingStopped {
        media_streaming_update: Option<MediaStreamingUpdate>,
    }
}

event_payload! {
    MediaStreamingFailed {
        media_streaming_update: Option<MediaStreamingUpdate>,
    }
}
