//! Call Automation event variants.
//!
//! Every notification the service sends is one [`CallAutomationEvent`]. The
//! variant is chosen by the CloudEvent `type` discriminator via
//! [`EventKind::from_event_type`]; the payload structs live in the
//! per-family submodules and all share an [`EventBase`].

use serde::Deserialize;

use super::reason_code::{OperationFamily, ReasonCode, ResultInformation};

/// Prefix shared by every discriminator in the catalog.
pub const EVENT_TYPE_PREFIX: &str = "Microsoft.Communication.";

/// Fields common to every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBase {
    /// The call leg this event pertains to; primary correlation key.
    pub call_connection_id: String,
    #[serde(default)]
    pub server_call_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// Caller-supplied string echoed back from the originating request.
    #[serde(default)]
    pub operation_context: Option<String>,
}

/// Defines an event payload struct: the shared base, optional result
/// information, and the event-specific fields (all defaulted).
macro_rules! event_payload {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(flatten)]
            pub base: $crate::objects::events::EventBase,
            #[serde(default)]
            pub result_information: Option<$crate::objects::reason_code::ResultInformation>,
            $(
                $(#[$field_meta])*
                #[serde(default)]
                pub $field: $ty,
            )*
        }
    };
}

mod call;
mod dialog;
mod media;
mod participant;
mod recording;
mod streaming;
mod transcription;

pub use call::{
    AnswerFailed, CallConnected, CallDisconnected, CallParticipant, CallTransferAccepted,
    CallTransferFailed, ConnectFailed, CreateCallFailed, HoldFailed, ParticipantsUpdated,
};
pub use dialog::{
    DialogCompleted, DialogConsent, DialogFailed, DialogHangup, DialogInputType,
    DialogLanguageChange, DialogSensitivityUpdate, DialogStarted, DialogTransfer, UserConsent,
};
pub use media::{
    ChoiceResult, ContinuousDtmfRecognitionStopped, ContinuousDtmfRecognitionToneFailed,
    ContinuousDtmfRecognitionToneReceived, DtmfResult, DtmfTone, PlayCanceled, PlayCompleted,
    PlayFailed, PlayStarted, RecognitionType, RecognizeCanceled, RecognizeCompleted,
    RecognizeFailed, RecognizeResult, SendDtmfTonesCompleted, SendDtmfTonesFailed, SpeechResult,
};
pub use participant::{
    AddParticipantFailed, AddParticipantSucceeded, CancelAddParticipantFailed,
    CancelAddParticipantSucceeded, RemoveParticipantFailed, RemoveParticipantSucceeded,
};
pub use recording::{
    RecordingKind, RecordingState, RecordingStateChanged, StartRecordingFailed,
    TeamsComplianceRecordingStateChanged, TeamsRecordingStateChanged,
};
pub use streaming::{
    MediaStreamingFailed, MediaStreamingStarted, MediaStreamingStatus, MediaStreamingStopped,
    MediaStreamingUpdate,
};
pub use transcription::{
    TranscriptionFailed, TranscriptionResumed, TranscriptionStarted, TranscriptionStatus,
    TranscriptionStopped, TranscriptionUpdate, TranscriptionUpdated,
};

/// A payload type that corresponds to exactly one [`EventKind`].
///
/// Lets callers ask for a concrete payload instead of matching on
/// [`CallAutomationEvent`] themselves.
pub trait TypedEvent: Sized {
    const KIND: EventKind;

    /// Unwrap `event` if it carries this payload type.
    fn from_event(event: CallAutomationEvent) -> Option<Self>;

    fn base(&self) -> &EventBase;
}

/// Generates [`EventKind`], [`CallAutomationEvent`] and the discriminator
/// table from one catalog so the three can never drift apart.
macro_rules! call_automation_events {
    (
        $(
            $(#[$attr:meta])*
            $variant:ident => $wire:literal [$family:ident]
        ),+ $(,)?
    ) => {
        /// Event kind, one per discriminator in the catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EventKind {
            $(
                $(#[$attr])*
                $variant,
            )+
        }

        impl EventKind {
            /// Every kind in catalog order.
            pub const ALL: &'static [EventKind] = &[$(EventKind::$variant,)+];

            /// Full wire discriminator.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( EventKind::$variant => $wire, )+
                }
            }

            /// Look up a wire discriminator. Matching is exact.
            pub fn from_event_type(event_type: &str) -> Option<Self> {
                match event_type {
                    $( $wire => Some(EventKind::$variant), )+
                    _ => None,
                }
            }

            /// Which reason-code table classifies this kind's results.
            pub fn operation_family(&self) -> OperationFamily {
                match self {
                    $( EventKind::$variant => OperationFamily::$family, )+
                }
            }
        }

        /// A parsed Call Automation notification.
        ///
        /// The set is closed: dispatch sites can match every variant without
        /// a wildcard arm, and adding a kind is a breaking change.
        #[derive(Debug, Clone, PartialEq)]
        pub enum CallAutomationEvent {
            $(
                $(#[$attr])*
                $variant($variant),
            )+
        }

        impl CallAutomationEvent {
            pub fn kind(&self) -> EventKind {
                match self {
                    $( CallAutomationEvent::$variant(_) => EventKind::$variant, )+
                }
            }

            pub fn base(&self) -> &EventBase {
                match self {
                    $( CallAutomationEvent::$variant(e) => &e.base, )+
                }
            }

            pub fn result_information(&self) -> Option<&ResultInformation> {
                match self {
                    $( CallAutomationEvent::$variant(e) => e.result_information.as_ref(), )+
                }
            }

            /// Decode the `data` object of an envelope whose discriminator
            /// resolved to `kind`.
            pub(crate) fn from_data(
                kind: EventKind,
                data: serde_json::Value,
            ) -> Result<Self, serde_json::Error> {
                match kind {
                    $(
                        EventKind::$variant => {
                            serde_json::from_value::<$variant>(data).map(CallAutomationEvent::$variant)
                        }
                    )+
                }
            }
        }

        $(
            impl TypedEvent for $variant {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: CallAutomationEvent) -> Option<Self> {
                    match event {
                        CallAutomationEvent::$variant(e) => Some(e),
                        _ => None,
                    }
                }

                fn base(&self) -> &EventBase {
                    &self.base
                }
            }

            impl From<$variant> for CallAutomationEvent {
                fn from(event: $variant) -> Self {
                    CallAutomationEvent::$variant(event)
                }
            }
        )+
    };
}

call_automation_events! {
    CallConnected => "Microsoft.Communication.CallConnected" [General],
    CallDisconnected => "Microsoft.Communication.CallDisconnected" [General],
    ParticipantsUpdated => "Microsoft.Communication.ParticipantsUpdated" [General],
    CallTransferAccepted => "Microsoft.Communication.CallTransferAccepted" [General],
    CallTransferFailed => "Microsoft.Communication.CallTransferFailed" [General],
    AnswerFailed => "Microsoft.Communication.AnswerFailed" [General],
    CreateCallFailed => "Microsoft.Communication.CreateCallFailed" [General],
    ConnectFailed => "Microsoft.Communication.ConnectFailed" [General],
    HoldFailed => "Microsoft.Communication.HoldFailed" [General],

    AddParticipantSucceeded => "Microsoft.Communication.AddParticipantSucceeded" [General],
    AddParticipantFailed => "Microsoft.Communication.AddParticipantFailed" [General],
    RemoveParticipantSucceeded => "Microsoft.Communication.RemoveParticipantSucceeded" [General],
    RemoveParticipantFailed => "Microsoft.Communication.RemoveParticipantFailed" [General],
    CancelAddParticipantSucceeded => "Microsoft.Communication.CancelAddParticipantSucceeded" [General],
    CancelAddParticipantFailed => "Microsoft.Communication.CancelAddParticipantFailed" [General],

    PlayStarted => "Microsoft.Communication.PlayStarted" [Play],
    PlayCompleted => "Microsoft.Communication.PlayCompleted" [Play],
    PlayFailed => "Microsoft.Communication.PlayFailed" [Play],
    PlayCanceled => "Microsoft.Communication.PlayCanceled" [Play],

    RecognizeCompleted => "Microsoft.Communication.RecognizeCompleted" [Recognize],
    RecognizeFailed => "Microsoft.Communication.RecognizeFailed" [Recognize],
    RecognizeCanceled => "Microsoft.Communication.RecognizeCanceled" [Recognize],

    ContinuousDtmfRecognitionToneReceived => "Microsoft.Communication.ContinuousDtmfRecognitionToneReceived" [Recognize],
    ContinuousDtmfRecognitionToneFailed => "Microsoft.Communication.ContinuousDtmfRecognitionToneFailed" [Recognize],
    ContinuousDtmfRecognitionStopped => "Microsoft.Communication.ContinuousDtmfRecognitionStopped" [Recognize],
    SendDtmfTonesCompleted => "Microsoft.Communication.SendDtmfTonesCompleted" [General],
    SendDtmfTonesFailed => "Microsoft.Communication.SendDtmfTonesFailed" [General],

    RecordingStateChanged => "Microsoft.Communication.RecordingStateChanged" [General],
    TeamsRecordingStateChanged => "Microsoft.Communication.TeamsRecordingStateChanged" [General],
    TeamsComplianceRecordingStateChanged => "Microsoft.Communication.TeamsComplianceRecordingStateChanged" [General],
    StartRecordingFailed => "Microsoft.Communication.StartRecordingFailed" [General],

    DialogStarted => "Microsoft.Communication.DialogStarted" [General],
    DialogCompleted => "Microsoft.Communication.DialogCompleted" [General],
    DialogFailed => "Microsoft.Communication.DialogFailed" [General],
    DialogConsent => "Microsoft.Communication.DialogConsent" [General],
    DialogHangup => "Microsoft.Communication.DialogHangup" [General],
    DialogLanguageChange => "Microsoft.Communication.DialogLanguageChange" [General],
    DialogSensitivityUpdate => "Microsoft.Communication.DialogSensitivityUpdate" [General],
    DialogTransfer => "Microsoft.Communication.DialogTransfer" [General],

    TranscriptionStarted => "Microsoft.Communication.TranscriptionStarted" [General],
    TranscriptionStopped => "Microsoft.Communication.TranscriptionStopped" [General],
    TranscriptionResumed => "Microsoft.Communication.TranscriptionResumed" [General],
    TranscriptionUpdated => "Microsoft.Communication.TranscriptionUpdated" [General],
    TranscriptionFailed => "Microsoft.Communication.TranscriptionFailed" [General],

    MediaStreamingStarted => "Microsoft.Communication.MediaStreamingStarted" [General],
    MediaStreamingStopped => "Microsoft.Communication.MediaStreamingStopped" [General],
    MediaStreamingFailed => "Microsoft.Communication.MediaStreamingFailed" [General],
}

impl EventKind {
    /// Discriminator without the `Microsoft.Communication.` prefix.
    pub fn name(&self) -> &'static str {
        let wire = self.as_str();
        wire.strip_prefix(EVENT_TYPE_PREFIX).unwrap_or(wire)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl CallAutomationEvent {
    pub fn call_connection_id(&self) -> &str {
        &self.base().call_connection_id
    }

    pub fn operation_context(&self) -> Option<&str> {
        self.base().operation_context.as_deref()
    }

    /// Classify the result information with this kind's reason-code table.
    ///
    /// `None` when the event carries no result information at all.
    pub fn reason_code(&self) -> Option<ReasonCode> {
        let family = self.kind().operation_family();
        self.result_information()
            .map(|info| info.reason_code(family))
    }

    /// Unwrap into a concrete payload type.
    pub fn into_typed<T: TypedEvent>(self) -> Option<T> {
        T::from_event(self)
    }
}
