//! Communication identifiers carried by participant and transfer events.
//!
//! The service serializes identifiers as a loosely-typed model where the
//! `kind` field (or, on older payloads, whichever nested object is present)
//! decides the concrete identity. [`CommunicationIdentifier`] is the closed
//! Rust view of that model.

use serde::{Deserialize, Serialize};

/// Raw identifier model exactly as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationIdentifierModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_user: Option<CommunicationUserModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumberModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft_teams_user: Option<MicrosoftTeamsUserModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft_teams_app: Option<MicrosoftTeamsAppModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationUserModel {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumberModel {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrosoftTeamsUserModel {
    pub user_id: String,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub cloud: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrosoftTeamsAppModel {
    pub app_id: String,
    #[serde(default)]
    pub cloud: Option<String>,
}

/// A participant identity in a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "CommunicationIdentifierModel",
    into = "CommunicationIdentifierModel"
)]
pub enum CommunicationIdentifier {
    /// An Azure Communication Services user.
    CommunicationUser { id: String },
    /// A PSTN phone number in E.164 format.
    PhoneNumber {
        phone_number: String,
        raw_id: Option<String>,
    },
    /// A Microsoft Teams user.
    MicrosoftTeamsUser {
        user_id: String,
        is_anonymous: bool,
        cloud: Option<String>,
    },
    /// A Microsoft Teams application (bot).
    MicrosoftTeamsApp { app_id: String, cloud: Option<String> },
    /// Any identity this library does not model, kept by raw id.
    Unknown { raw_id: String },
}

impl CommunicationIdentifier {
    /// The canonical raw id for this identifier.
    ///
    /// Phone numbers without an explicit raw id use the `4:` prefix form.
    pub fn raw_id(&self) -> String {
        match self {
            Self::CommunicationUser { id } => id.clone(),
            Self::PhoneNumber {
                raw_id: Some(raw_id),
                ..
            } => raw_id.clone(),
            Self::PhoneNumber { phone_number, .. } => format!("4:{phone_number}"),
            Self::MicrosoftTeamsUser {
                user_id,
                is_anonymous,
                cloud,
            } => {
                if *is_anonymous {
                    format!("8:teamsvisitor:{user_id}")
                } else {
                    let prefix = match cloud.as_deref() {
                        Some("dod") => "8:dod:",
                        Some("gcch") => "8:gcch:",
                        _ => "8:orgid:",
                    };
                    format!("{prefix}{user_id}")
                }
            }
            Self::MicrosoftTeamsApp { app_id, cloud } => {
                let prefix = match cloud.as_deref() {
                    Some("dod") => "28:dod:",
                    Some("gcch") => "28:gcch:",
                    _ => "28:orgid:",
                };
                format!("{prefix}{app_id}")
            }
            Self::Unknown { raw_id } => raw_id.clone(),
        }
    }
}

impl From<CommunicationIdentifierModel> for CommunicationIdentifier {
    fn from(model: CommunicationIdentifierModel) -> Self {
        let kind = model.kind.as_deref().map(str::to_ascii_lowercase);
        let raw_id = model.raw_id;

        match (
            kind.as_deref(),
            model.communication_user,
            model.phone_number,
            model.microsoft_teams_user,
            model.microsoft_teams_app,
        ) {
            (Some("communicationuser") | None, Some(user), _, _, _) => {
                Self::CommunicationUser { id: user.id }
            }
            (Some("phonenumber") | None, _, Some(phone), _, _) => Self::PhoneNumber {
                phone_number: phone.value,
                raw_id,
            },
            (Some("microsoftteamsuser") | None, _, _, Some(user), _) => {
                Self::MicrosoftTeamsUser {
                    user_id: user.user_id,
                    is_anonymous: user.is_anonymous.unwrap_or(false),
                    cloud: user.cloud,
                }
            }
            (Some("microsoftteamsapp") | None, _, _, _, Some(app)) => Self::MicrosoftTeamsApp {
                app_id: app.app_id,
                cloud: app.cloud,
            },
            _ => Self::Unknown {
                raw_id: raw_id.unwrap_or_default(),
            },
        }
    }
}

impl From<CommunicationIdentifier> for CommunicationIdentifierModel {
    fn from(identifier: CommunicationIdentifier) -> Self {
        let raw_id = Some(identifier.raw_id());
        match identifier {
            CommunicationIdentifier::CommunicationUser { id } => Self {
                raw_id,
                kind: Some("communicationUser".to_string()),
                communication_user: Some(CommunicationUserModel { id }),
                ..Default::default()
            },
            CommunicationIdentifier::PhoneNumber { phone_number, .. } => Self {
                raw_id,
                kind: Some("phoneNumber".to_string()),
                phone_number: Some(PhoneNumberModel {
                    value: phone_number,
                }),
                ..Default::default()
            },
            CommunicationIdentifier::MicrosoftTeamsUser {
                user_id,
                is_anonymous,
                cloud,
            } => Self {
                raw_id,
                kind: Some("microsoftTeamsUser".to_string()),
                microsoft_teams_user: Some(MicrosoftTeamsUserModel {
                    user_id,
                    is_anonymous: Some(is_anonymous),
                    cloud,
                }),
                ..Default::default()
            },
            CommunicationIdentifier::MicrosoftTeamsApp { app_id, cloud } => Self {
                raw_id,
                kind: Some("microsoftTeamsApp".to_string()),
                microsoft_teams_app: Some(MicrosoftTeamsAppModel { app_id, cloud }),
                ..Default::default()
            },
            CommunicationIdentifier::Unknown { .. } => Self {
                raw_id,
                kind: Some("unknown".to_string()),
                ..Default::default()
            },
        }
    }
}
