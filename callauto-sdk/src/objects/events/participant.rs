//! Add/remove participant operation results.

use crate::objects::identifier::CommunicationIdentifier;

event_payload! {
    AddParticipantSucceeded {
        participant: Option<CommunicationIdentifier>,
    }
}

event_payload! {
    AddParticipantFailed {
        participant: Option<CommunicationIdentifier>,
    }
}

event_payload! {
    RemoveParticipantSucceeded {
        participant: Option<CommunicationIdentifier>,
    }
}

event_payload! {
    RemoveParticipantFailed {
        participant: Option<CommunicationIdentifier>,
    }
}

event_payload! {
    /// A pending add-participant invitation was withdrawn.
    CancelAddParticipantSucceeded {
        invitation_id: Option<String>,
    }
}

event_payload! {
    CancelAddParticipantFailed {
        invitation_id: Option<String>,
    }
}
