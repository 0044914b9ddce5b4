//! Webhook body in, resolved waits out.

use callauto_core::config::EventProcessorConfig;
use callauto_core::events::{event_batch_channel, EventKind};
use callauto_core::processors::{EventProcessor, WaitError};
use callauto_sdk::objects::events::{PlayFailed, RecognizeCompleted, RecognizeResult};
use callauto_sdk::objects::{PlayReason, ReasonCode};
use callauto_sdk::parser::{parse_events, EventParseError};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CALL_ID: &str = "421f0b00-2c1d-4b5a-9f3e-1a2b3c4d5e6f";
const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn envelope(event_type: &str, data: &str) -> String {
    format!(
        r#"{{
            "id": "evt-{event_type}",
            "source": "calling/callConnections/{CALL_ID}",
            "type": "Microsoft.Communication.{event_type}",
            "data": {data},
            "time": "2026-10-18T09:15:00.123Z",
            "specversion": "1.0",
            "datacontenttype": "application/json",
            "subject": "calling/callConnections/{CALL_ID}"
        }}"#
    )
}

fn batch(envelopes: &[String]) -> String {
    format!("[{}]", envelopes.join(","))
}

#[tokio::test]
async fn test_call_setup_menu_and_failure() {
    init_tracing();
    let processor = EventProcessor::default();

    // The connect notification lands before anybody waits for it.
    let connected = batch(&[envelope(
        "CallConnected",
        &format!(
            r#"{{"callConnectionId": "{CALL_ID}", "serverCallId": "srv-1", "correlationId": "corr-1"}}"#
        ),
    )]);
    assert_eq!(processor.process_payload(&connected).unwrap(), 1);
    let event = processor
        .wait_for_event(CALL_ID, EventKind::CallConnected, WAIT)
        .await
        .unwrap();
    assert_eq!(event.base().server_call_id.as_deref(), Some("srv-1"));

    // A menu prompt and a greeting run concurrently on the same call.
    let menu = {
        let processor = processor.clone();
        tokio::spawn(async move {
            processor
                .wait_for::<RecognizeCompleted>(CALL_ID, Some("main-menu"))
                .await
        })
    };
    let greeting = {
        let processor = processor.clone();
        tokio::spawn(async move {
            processor
                .wait_for_event_with_context(CALL_ID, EventKind::PlayFailed, "greeting", WAIT)
                .await
        })
    };
    while processor.stats().pending_waits < 2 {
        tokio::task::yield_now().await;
    }

    let body = batch(&[
        envelope(
            "PlayFailed",
            &format!(
                r#"{{
                    "callConnectionId": "{CALL_ID}",
                    "operationContext": "greeting",
                    "resultInformation": {{"code": 400, "subCode": 8536, "message": "File could not be downloaded."}},
                    "failedPlaySourceIndex": 0
                }}"#
            ),
        ),
        envelope("SomeFutureEvent", r#"{"callConnectionId": "ignored"}"#),
        envelope(
            "RecognizeCompleted",
            &format!(
                r#"{{
                    "callConnectionId": "{CALL_ID}",
                    "operationContext": "main-menu",
                    "recognitionType": "dtmf",
                    "dtmfResult": {{"tones": ["one", "pound"]}},
                    "resultInformation": {{"code": 200, "subCode": 8533, "message": "Action completed, DTMF option matched."}}
                }}"#
            ),
        ),
    ]);
    assert_eq!(processor.process_payload(&body).unwrap(), 2);

    let recognized = menu.await.unwrap().unwrap();
    match &recognized.recognize_result {
        Some(RecognizeResult::Dtmf(dtmf)) => assert_eq!(dtmf.to_digits(), "1#"),
        other => panic!("unexpected recognize result {other:?}"),
    }

    let failed = greeting.await.unwrap().unwrap();
    assert_eq!(
        failed.reason_code(),
        Some(ReasonCode::Play(PlayReason::DownloadFailed))
    );
    let failed: PlayFailed = failed.into_typed().unwrap();
    assert_eq!(failed.failed_play_source_index, Some(0));

    assert_eq!(processor.stats().pending_waits, 0);
}

#[tokio::test]
async fn test_malformed_known_event_rejects_payload() {
    init_tracing();
    let processor = EventProcessor::default();
    let body = batch(&[envelope("CallConnected", r#"{"serverCallId": "srv-1"}"#)]);

    let err = processor.process_payload(&body).unwrap_err();
    assert!(matches!(err, EventParseError::InvalidEventData { .. }));
    assert!(processor.latest_event(CALL_ID, EventKind::CallConnected).is_none());
}

#[tokio::test]
async fn test_ongoing_dtmf_tones_through_run_loop() {
    init_tracing();
    let processor = EventProcessor::new(EventProcessorConfig::default());
    let mut tones = processor.subscribe(CALL_ID, EventKind::ContinuousDtmfRecognitionToneReceived);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (batch_tx, batch_rx) = event_batch_channel();
    let handle = tokio::spawn(processor.clone().run(shutdown_rx, batch_rx));

    for (sequence, tone) in ["five", "five", "asterisk"].iter().enumerate() {
        let body = batch(&[envelope(
            "ContinuousDtmfRecognitionToneReceived",
            &format!(
                r#"{{"callConnectionId": "{CALL_ID}", "sequenceId": {sequence}, "tone": "{tone}"}}"#
            ),
        )]);
        batch_tx.send(parse_events(&body).unwrap()).await.unwrap();
    }

    let mut digits = String::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(WAIT, tones.recv())
            .await
            .unwrap()
            .unwrap();
        if let callauto_sdk::CallAutomationEvent::ContinuousDtmfRecognitionToneReceived(tone) =
            event
        {
            digits.extend(tone.tone.and_then(|t| t.to_char()));
        }
    }
    assert_eq!(digits, "55*");

    processor.detach_ongoing_event_processor(
        CALL_ID,
        EventKind::ContinuousDtmfRecognitionToneReceived,
    );
    assert!(tones.recv().await.is_none());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_forgotten_call_cancels_waiters() {
    init_tracing();
    let processor = EventProcessor::default();
    let waiter = {
        let processor = processor.clone();
        tokio::spawn(async move {
            processor
                .wait_for_event(CALL_ID, EventKind::CallDisconnected, WAIT)
                .await
        })
    };
    while processor.stats().pending_waits == 0 {
        tokio::task::yield_now().await;
    }

    processor.forget_call_connection(CALL_ID);
    assert!(matches!(waiter.await.unwrap(), Err(WaitError::Cancelled)));
}
