//! Play, recognize and DTMF events.
//!
//! `RecognizeCompleted` is the one payload with a second discriminator:
//! `recognitionType` decides which of `dtmfResult`, `choiceResult` or
//! `speechResult` holds the outcome.

use serde::Deserialize;

use super::EventBase;
use crate::objects::reason_code::ResultInformation;

event_payload! {
    PlayStarted {}
}

event_payload! {
    PlayCompleted {}
}

event_payload! {
    PlayFailed {
        /// Index of the play source that failed, when several were queued.
        failed_play_source_index: Option<i32>,
    }
}

event_payload! {
    PlayCanceled {}
}

event_payload! {
    RecognizeFailed {
        failed_play_source_index: Option<i32>,
    }
}

event_payload! {
    RecognizeCanceled {}
}

event_payload! {
    ContinuousDtmfRecognitionToneFailed {}
}

event_payload! {
    ContinuousDtmfRecognitionStopped {}
}

event_payload! {
    SendDtmfTonesCompleted {}
}

event_payload! {
    SendDtmfTonesFailed {}
}

/// A single DTMF tone as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtmfTone {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    A,
    B,
    C,
    D,
    Pound,
    Asterisk,
    #[serde(other)]
    Unknown,
}

impl DtmfTone {
    /// Keypad character, `None` for [`DtmfTone::Unknown`].
    pub fn to_char(self) -> Option<char> {
        let c = match self {
            DtmfTone::Zero => '0',
            DtmfTone::One => '1',
            DtmfTone::Two => '2',
            DtmfTone::Three => '3',
            DtmfTone::Four => '4',
            DtmfTone::Five => '5',
            DtmfTone::Six => '6',
            DtmfTone::Seven => '7',
            DtmfTone::Eight => '8',
            DtmfTone::Nine => '9',
            DtmfTone::A => 'A',
            DtmfTone::B => 'B',
            DtmfTone::C => 'C',
            DtmfTone::D => 'D',
            DtmfTone::Pound => '#',
            DtmfTone::Asterisk => '*',
            DtmfTone::Unknown => return None,
        };
        Some(c)
    }
}

/// Which kind of input a recognize operation collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognitionType {
    Dtmf,
    Choices,
    Speech,
    SpeechOrDtmf,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DtmfResult {
    #[serde(default)]
    pub tones: Vec<DtmfTone>,
}

impl DtmfResult {
    /// The collected tones as a keypad string; unknown tones are skipped.
    pub fn to_digits(&self) -> String {
        self.tones.iter().filter_map(|t| t.to_char()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResult {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub recognized_phrase: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpeechResult {
    #[serde(default)]
    pub speech: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Outcome of a completed recognize operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizeResult {
    Dtmf(DtmfResult),
    Choice(ChoiceResult),
    Speech(SpeechResult),
}

/// A recognize operation finished and collected input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RecognizeCompletedWire")]
pub struct RecognizeCompleted {
    pub base: EventBase,
    pub result_information: Option<ResultInformation>,
    pub recognition_type: Option<RecognitionType>,
    /// `None` when the result object named by `recognition_type` is absent.
    pub recognize_result: Option<RecognizeResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeCompletedWire {
    #[serde(flatten)]
    base: EventBase,
    #[serde(default)]
    result_information: Option<ResultInformation>,
    #[serde(default)]
    recognition_type: Option<RecognitionType>,
    #[serde(default)]
    dtmf_result: Option<DtmfResult>,
    #[serde(default)]
    choice_result: Option<ChoiceResult>,
    #[serde(default)]
    speech_result: Option<SpeechResult>,
}

impl From<RecognizeCompletedWire> for RecognizeCompleted {
    fn from(wire: RecognizeCompletedWire) -> Self {
        let recognize_result = match wire.recognition_type {
            Some(RecognitionType::Dtmf) => wire.dtmf_result.map(RecognizeResult::Dtmf),
            Some(RecognitionType::Choices) => wire.choice_result.map(RecognizeResult::Choice),
            Some(RecognitionType::Speech) => wire.speech_result.map(RecognizeResult::Speech),
            // Either modality may have won the race.
            Some(RecognitionType::SpeechOrDtmf) => wire
                .dtmf_result
                .map(RecognizeResult::Dtmf)
                .or_else(|| wire.speech_result.map(RecognizeResult::Speech)),
            Some(RecognitionType::Unknown) | None => None,
        };

        Self {
            base: wire.base,
            result_information: wire.result_information,
            recognition_type: wire.recognition_type,
            recognize_result,
        }
    }
}

/// One tone observed by continuous DTMF recognition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ToneReceivedWire")]
pub struct ContinuousDtmfRecognitionToneReceived {
    pub base: EventBase,
    pub result_information: Option<ResultInformation>,
    /// Monotonic per-call sequence of received tones.
    pub sequence_id: Option<i32>,
    pub tone: Option<DtmfTone>,
}

/// Older payloads nest the tone under `toneInfo`; newer ones flatten it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToneReceivedWire {
    #[serde(flatten)]
    base: EventBase,
    #[serde(default)]
    result_information: Option<ResultInformation>,
    #[serde(default)]
    sequence_id: Option<i32>,
    #[serde(default)]
    tone: Option<DtmfTone>,
    #[serde(default)]
    tone_info: Option<ToneInfoWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToneInfoWire {
    #[serde(default)]
    sequence_id: Option<i32>,
    #[serde(default)]
    tone: Option<DtmfTone>,
}

impl From<ToneReceivedWire> for ContinuousDtmfRecognitionToneReceived {
    fn from(wire: ToneReceivedWire) -> Self {
        let (nested_sequence, nested_tone) = match wire.tone_info {
            Some(info) => (info.sequence_id, info.tone),
            None => (None, None),
        };
        Self {
            base: wire.base,
            result_information: wire.result_information,
            sequence_id: wire.sequence_id.or(nested_sequence),
            tone: wire.tone.or(nested_tone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_or_dtmf_prefers_dtmf() {
        let json = r#"{
            "callConnectionId": "c1",
            "recognitionType": "speechOrDtmf",
            "dtmfResult": {"tones": ["five", "pound"]},
            "speechResult": {"speech": "five"}
        }"#;
        let event: RecognizeCompleted = serde_json::from_str(json).unwrap();
        match event.recognize_result {
            Some(RecognizeResult::Dtmf(result)) => assert_eq!(result.to_digits(), "5#"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_choice_result() {
        let json = r#"{
            "callConnectionId": "c1",
            "recognitionType": "choices",
            "choiceResult": {"label": "Confirm", "recognizedPhrase": "yes", "confidence": 0.9}
        }"#;
        let event: RecognizeCompleted = serde_json::from_str(json).unwrap();
        let Some(RecognizeResult::Choice(choice)) = event.recognize_result else {
            panic!("expected choice result");
        };
        assert_eq!(choice.label.as_deref(), Some("Confirm"));
        assert_eq!(choice.recognized_phrase.as_deref(), Some("yes"));
    }

    #[test]
    fn test_missing_result_object() {
        let json = r#"{"callConnectionId": "c1", "recognitionType": "speech"}"#;
        let event: RecognizeCompleted = serde_json::from_str(json).unwrap();
        assert_eq!(event.recognition_type, Some(RecognitionType::Speech));
        assert!(event.recognize_result.is_none());
    }

    #[test]
    fn test_unknown_recognition_type() {
        let json = r#"{"callConnectionId": "c1", "recognitionType": "telepathy"}"#;
        let event: RecognizeCompleted = serde_json::from_str(json).unwrap();
        assert_eq!(event.recognition_type, Some(RecognitionType::Unknown));
    }

    #[test]
    fn test_nested_tone_info() {
        let json = r#"{"callConnectionId": "c1", "toneInfo": {"sequenceId": 3, "tone": "asterisk"}}"#;
        let event: ContinuousDtmfRecognitionToneReceived = serde_json::from_str(json).unwrap();
        assert_eq!(event.sequence_id, Some(3));
        assert_eq!(event.tone, Some(DtmfTone::Asterisk));
    }

    #[test]
    fn test_unknown_tone() {
        let result: DtmfResult = serde_json::from_str(r#"{"tones": ["one", "flash", "two"]}"#).unwrap();
        assert_eq!(result.tones[1], DtmfTone::Unknown);
        assert_eq!(result.to_digits(), "12");
    }
}
