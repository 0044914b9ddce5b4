//! Result information and reason-code classification.
//!
//! Completion and failure events carry a `resultInformation` block with a
//! numeric `code` (HTTP-like status) and `subCode`. The sub-code is what
//! distinguishes *why* an operation ended, and its meaning depends on the
//! operation family that produced it, so classification goes through a
//! fixed table per [`OperationFamily`].

use serde::{Deserialize, Serialize};

/// Status block attached to completion/failure events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInformation {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub sub_code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResultInformation {
    /// Classify this result using the table for `family`.
    pub fn reason_code(&self, family: OperationFamily) -> ReasonCode {
        match self.sub_code {
            Some(sub_code) => ReasonCode::from_sub_code(family, sub_code),
            None => ReasonCode::Unspecified,
        }
    }
}

/// Which reason-code table applies to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationFamily {
    Play,
    Recognize,
    /// Call, participant, recording, dialog, transcription and streaming
    /// events. Only the shared codes apply.
    General,
}

/// Why a play operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayReason {
    /// 8535
    InvalidFileFormat,
    /// 8536
    DownloadFailed,
    /// 8565
    CognitiveServicesError,
}

/// Why a recognize operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizeReason {
    /// 8510
    InitialSilenceTimeout,
    /// 8511
    PlayPromptFailed,
    /// 8514
    StopToneDetected,
    /// 8531
    MaxDigitsReceived,
    /// 8532
    InterDigitTimeout,
    /// 8533
    DtmfOptionMatched,
    /// 8534
    IncorrectToneDetected,
    /// 8545
    SpeechOptionMatched,
    /// 8547
    SpeechOptionNotMatched,
    /// 8563
    SpeechNotRecognized,
    /// 8565
    CognitiveServicesError,
}

/// Symbolic classification of a `(code, subCode)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    CompletedSuccessfully,
    OperationCanceled,
    UnknownError,
    Play(PlayReason),
    Recognize(RecognizeReason),
    /// Sentinel for sub-codes not present in the table.
    Unspecified,
}

impl ReasonCode {
    pub const COMPLETED_SUCCESSFULLY: i32 = 0;
    pub const OPERATION_CANCELED: i32 = 8508;
    pub const UNKNOWN_ERROR: i32 = 9999;

    /// Look up `sub_code` in the table for `family`.
    ///
    /// Never fails: anything unmapped is [`ReasonCode::Unspecified`].
    pub fn from_sub_code(family: OperationFamily, sub_code: i32) -> Self {
        match sub_code {
            Self::COMPLETED_SUCCESSFULLY => return Self::CompletedSuccessfully,
            Self::UNKNOWN_ERROR => return Self::UnknownError,
            _ => {}
        }

        match family {
            OperationFamily::Play => match sub_code {
                Self::OPERATION_CANCELED => Self::OperationCanceled,
                8535 => Self::Play(PlayReason::InvalidFileFormat),
                8536 => Self::Play(PlayReason::DownloadFailed),
                8565 => Self::Play(PlayReason::CognitiveServicesError),
                _ => Self::Unspecified,
            },
            OperationFamily::Recognize => match sub_code {
                Self::OPERATION_CANCELED => Self::OperationCanceled,
                8510 => Self::Recognize(RecognizeReason::InitialSilenceTimeout),
                8511 => Self::Recognize(RecognizeReason::PlayPromptFailed),
                8514 => Self::Recognize(RecognizeReason::StopToneDetected),
                8531 => Self::Recognize(RecognizeReason::MaxDigitsReceived),
                8532 => Self::Recognize(RecognizeReason::InterDigitTimeout),
                8533 => Self::Recognize(RecognizeReason::DtmfOptionMatched),
                8534 => Self::Recognize(RecognizeReason::IncorrectToneDetected),
                8545 => Self::Recognize(RecognizeReason::SpeechOptionMatched),
                8547 => Self::Recognize(RecognizeReason::SpeechOptionNotMatched),
                8563 => Self::Recognize(RecognizeReason::SpeechNotRecognized),
                8565 => Self::Recognize(RecognizeReason::CognitiveServicesError),
                _ => Self::Unspecified,
            },
            OperationFamily::General => Self::Unspecified,
        }
    }

    /// The numeric sub-code this reason corresponds to, if any.
    pub fn sub_code(&self) -> Option<i32> {
        let code = match self {
            Self::CompletedSuccessfully => Self::COMPLETED_SUCCESSFULLY,
            Self::OperationCanceled => Self::OPERATION_CANCELED,
            Self::UnknownError => Self::UNKNOWN_ERROR,
            Self::Play(PlayReason::InvalidFileFormat) => 8535,
            Self::Play(PlayReason::DownloadFailed) => 8536,
            Self::Play(PlayReason::CognitiveServicesError) => 8565,
            Self::Recognize(reason) => match reason {
                RecognizeReason::InitialSilenceTimeout => 8510,
                RecognizeReason::PlayPromptFailed => 8511,
                RecognizeReason::StopToneDetected => 8514,
                RecognizeReason::MaxDigitsReceived => 8531,
                RecognizeReason::InterDigitTimeout => 8532,
                RecognizeReason::DtmfOptionMatched => 8533,
                RecognizeReason::IncorrectToneDetected => 8534,
                RecognizeReason::SpeechOptionMatched => 8545,
                RecognizeReason::SpeechOptionNotMatched => 8547,
                RecognizeReason::SpeechNotRecognized => 8563,
                RecognizeReason::CognitiveServicesError => 8565,
            },
            Self::Unspecified => return None,
        };
        Some(code)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonCode::CompletedSuccessfully => write!(f, "completed successfully"),
            ReasonCode::OperationCanceled => write!(f, "operation canceled"),
            ReasonCode::UnknownError => write!(f, "unknown error"),
            ReasonCode::Play(reason) => write!(f, "play: {reason:?}"),
            ReasonCode::Recognize(reason) => write!(f, "recognize: {reason:?}"),
            ReasonCode::Unspecified => write!(f, "unspecified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_table() {
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Recognize, 8510),
            ReasonCode::Recognize(RecognizeReason::InitialSilenceTimeout)
        );
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Recognize, 8533),
            ReasonCode::Recognize(RecognizeReason::DtmfOptionMatched)
        );
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Recognize, 8508),
            ReasonCode::OperationCanceled
        );
    }

    #[test]
    fn test_family_decides_meaning() {
        // 8565 means different things per family and nothing for General.
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Play, 8565),
            ReasonCode::Play(PlayReason::CognitiveServicesError)
        );
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Recognize, 8565),
            ReasonCode::Recognize(RecognizeReason::CognitiveServicesError)
        );
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::General, 8565),
            ReasonCode::Unspecified
        );
        assert_eq!(
            ReasonCode::from_sub_code(OperationFamily::Play, 8510),
            ReasonCode::Unspecified
        );
    }

    #[test]
    fn test_shared_codes() {
        for family in [
            OperationFamily::Play,
            OperationFamily::Recognize,
            OperationFamily::General,
        ] {
            assert_eq!(
                ReasonCode::from_sub_code(family, 0),
                ReasonCode::CompletedSuccessfully
            );
            assert_eq!(
                ReasonCode::from_sub_code(family, 9999),
                ReasonCode::UnknownError
            );
        }
    }

    #[test]
    fn test_sub_code_is_inverse_of_table() {
        for sub_code in [8510, 8511, 8514, 8531, 8532, 8533, 8534, 8545, 8547, 8563, 8565] {
            let reason = ReasonCode::from_sub_code(OperationFamily::Recognize, sub_code);
            assert_eq!(reason.sub_code(), Some(sub_code));
        }
        assert_eq!(ReasonCode::Unspecified.sub_code(), None);
    }

    #[test]
    fn test_missing_sub_code_is_unspecified() {
        let info = ResultInformation {
            code: Some(500),
            sub_code: None,
            message: None,
        };
        assert_eq!(
            info.reason_code(OperationFamily::Play),
            ReasonCode::Unspecified
        );
    }
}
