//! Downstream dispatch over the full event set without wildcard arms.

use callauto_sdk::objects::EventKind;
use callauto_sdk::parser::parse_event;
use callauto_sdk::CallAutomationEvent;
use serde_json::json;
use std::collections::BTreeMap;

fn family(event: &CallAutomationEvent) -> &'static str {
    use CallAutomationEvent as E;
    match event {
        E::CallConnected(_)
        | E::CallDisconnected(_)
        | E::ParticipantsUpdated(_)
        | E::CallTransferAccepted(_)
        | E::CallTransferFailed(_)
        | E::AnswerFailed(_)
        | E::CreateCallFailed(_)
        | E::ConnectFailed(_)
        | E::HoldFailed(_) => "call",
        E::AddParticipantSucceeded(_)
        | E::AddParticipantFailed(_)
        | E::RemoveParticipantSucceeded(_)
        | E::RemoveParticipantFailed(_)
        | E::CancelAddParticipantSucceeded(_)
        | E::CancelAddParticipantFailed(_) => "participants",
        E::PlayStarted(_) | E::PlayCompleted(_) | E::PlayFailed(_) | E::PlayCanceled(_) => "play",
        E::RecognizeCompleted(_) | E::RecognizeFailed(_) | E::RecognizeCanceled(_) => "recognize",
        E::ContinuousDtmfRecognitionToneReceived(_)
        | E::ContinuousDtmfRecognitionToneFailed(_)
        | E::ContinuousDtmfRecognitionStopped(_)
        | E::SendDtmfTonesCompleted(_)
        | E::SendDtmfTonesFailed(_) => "dtmf",
        E::RecordingStateChanged(_)
        | E::TeamsRecordingStateChanged(_)
        | E::TeamsComplianceRecordingStateChanged(_)
        | E::StartRecordingFailed(_) => "recording",
        E::DialogStarted(_)
        | E::DialogCompleted(_)
        | E::DialogFailed(_)
        | E::DialogConsent(_)
        | E::DialogHangup(_)
        | E::DialogLanguageChange(_)
        | E::DialogSensitivityUpdate(_)
        | E::DialogTransfer(_) => "dialog",
        E::TranscriptionStarted(_)
        | E::TranscriptionStopped(_)
        | E::TranscriptionResumed(_)
        | E::TranscriptionUpdated(_)
        | E::TranscriptionFailed(_) => "transcription",
        E::MediaStreamingStarted(_) | E::MediaStreamingStopped(_) | E::MediaStreamingFailed(_) => {
            "media_streaming"
        }
    }
}

#[test]
fn test_every_event_dispatches_to_a_family() {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for kind in EventKind::ALL {
        let payload = json!({
            "id": "1",
            "source": "calling/callConnections/c1",
            "type": kind.as_str(),
            "data": {"callConnectionId": "c1"},
            "specversion": "1.0"
        })
        .to_string();
        let event = parse_event(&payload).unwrap().unwrap();
        *counts.entry(family(&event)).or_default() += 1;
    }

    let expected = BTreeMap::from([
        ("call", 9),
        ("dialog", 8),
        ("dtmf", 5),
        ("media_streaming", 3),
        ("participants", 6),
        ("play", 4),
        ("recognize", 3),
        ("recording", 4),
        ("transcription", 5),
    ]);
    assert_eq!(counts, expected);
}
