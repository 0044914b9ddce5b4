//! Conversational dialog lifecycle events.
//!
//! `ivrContext` is an application-defined blob and stays as raw JSON.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DialogInputType {
    #[serde(rename = "powerVirtualAgents")]
    PowerVirtualAgents,
    #[serde(rename = "azureOpenAI")]
    AzureOpenAi,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserConsent {
    #[serde(default)]
    pub recording: Option<i32>,
}

event_payload! {
    DialogStarted {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
    }
}

event_payload! {
    DialogCompleted {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
    }
}

event_payload! {
    DialogFailed {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
    }
}

event_payload! {
    DialogConsent {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
        user_consent: Option<UserConsent>,
    }
}

event_payload! {
    DialogHangup {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
        ivr_context: Option<serde_json::Value>,
    }
}

event_payload! {
    DialogLanguageChange {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
        selected_language: Option<String>,
        ivr_context: Option<serde_json::Value>,
    }
}

event_payload! {
    DialogSensitivityUpdate {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
        sensitive_mask: Option<bool>,
    }
}

event_payload! {
    /// The bot asked for the call to be handed off.
    DialogTransfer {
        dialog_id: Option<String>,
        dialog_input_type: Option<DialogInputType>,
        transfer_type: Option<String>,
        transfer_destination: Option<String>,
        ivr_context: Option<serde_json::Value>,
    }
}
