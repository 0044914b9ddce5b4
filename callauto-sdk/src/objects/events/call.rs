//! Call lifecycle and transfer events.

use serde::Deserialize;

use crate::objects::identifier::CommunicationIdentifier;

event_payload! {
    /// The call connection is established and ready for actions.
    CallConnected {}
}

event_payload! {
    /// The call connection has ended.
    CallDisconnected {}
}

/// One participant entry in a [`ParticipantsUpdated`] roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParticipant {
    pub identifier: CommunicationIdentifier,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_on_hold: bool,
}

event_payload! {
    /// The full participant roster after a change.
    ParticipantsUpdated {
        participants: Vec<CallParticipant>,
        sequence_number: Option<i32>,
    }
}

event_payload! {
    CallTransferAccepted {
        transfer_target: Option<CommunicationIdentifier>,
        transferee: Option<CommunicationIdentifier>,
    }
}

event_payload! {
    CallTransferFailed {}
}

event_payload! {
    AnswerFailed {}
}

event_payload! {
    CreateCallFailed {}
}

event_payload! {
    ConnectFailed {}
}

event_payload! {
    HoldFailed {}
}
