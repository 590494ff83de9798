use std::sync::Arc;
use vidscribe::config::{Config, SourceConfig};
use vidscribe::fallback::FixedDelayPacer;
use vidscribe::source::{
    CaptionFragment, MockCaptionFetcher, MockCommandRunner, YtDlp, extract_video_id,
};
use vidscribe::stt::MockRecognizer;
use vidscribe::{TranscribeOptions, TranscriptSource, TranscriptionService, VidscribeError};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn info_json(duration: u64) -> String {
    format!(
        r#"{{
            "id": "dQw4w9WgXcQ",
            "title": "Talk",
            "duration": {duration},
            "ext": "m4a",
            "abr": 256.0,
            "subtitles": {{}},
            "automatic_captions": {{
                "en": [{{"ext": "json3", "url": "https://example.com/en.json3"}}]
            }}
        }}"#
    )
}

struct Setup {
    runner: Arc<MockCommandRunner>,
    captions: Arc<MockCaptionFetcher>,
    recognizer: Arc<MockRecognizer>,
    service: TranscriptionService,
}

fn setup(
    runner: MockCommandRunner,
    captions: MockCaptionFetcher,
    recognizer: MockRecognizer,
) -> Setup {
    let config = Config::default();
    let runner = Arc::new(runner);
    let captions = Arc::new(captions);
    let recognizer = Arc::new(recognizer);
    let ytdlp = Arc::new(YtDlp::with_runner(&SourceConfig::default(), runner.clone()));

    let service = TranscriptionService::new(
        &config,
        ytdlp.clone(),
        captions.clone(),
        ytdlp,
        recognizer.clone(),
        Arc::new(FixedDelayPacer::unpaced()),
    )
    .unwrap();

    Setup {
        runner,
        captions,
        recognizer,
        service,
    }
}

#[tokio::test]
async fn captions_win_when_available() {
    let s = setup(
        MockCommandRunner::new().on("-J", info_json(300)),
        MockCaptionFetcher::new(vec![
            CaptionFragment::new("we're no strangers", 0, 2000),
            CaptionFragment::new("to   love", 2000, 1500),
        ]),
        MockRecognizer::new("mock"),
    );

    let outcome = s
        .service
        .transcribe(WATCH_URL, &TranscribeOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.source, TranscriptSource::Captions);
    assert_eq!(outcome.transcript, "we're no strangers to love");
    assert_eq!(outcome.duration_seconds, 300);
    assert_eq!(s.recognizer.call_count(), 0);
    // Only the metadata lookup ran; no audio was downloaded.
    assert_eq!(s.runner.invocations().len(), 1);
}

#[tokio::test]
async fn recognition_runs_when_captions_are_missing() {
    let s = setup(
        MockCommandRunner::new()
            .on("-J", info_json(300))
            .on("-o", vec![1u8; 4096]),
        MockCaptionFetcher::unavailable(),
        MockRecognizer::new("mock").with_response(" recognized speech "),
    );

    let options = TranscribeOptions::default()
        .with_language("en")
        .with_auto_language_detection(false);
    let outcome = s.service.transcribe(WATCH_URL, &options).await.unwrap();

    assert_eq!(outcome.source, TranscriptSource::Asr);
    assert_eq!(outcome.transcript, "recognized speech");
    assert_eq!(outcome.language, "en");
    assert_eq!(outcome.duration_seconds, 300);
    assert_eq!(s.captions.languages(), vec!["en".to_string()]);

    let calls = s.recognizer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].length, 4096);
    assert_eq!(calls[0].media_type, "audio/mp4");
    assert_eq!(calls[0].language.as_deref(), Some("en"));
}

#[tokio::test]
async fn over_limit_source_is_rejected_before_download() {
    let s = setup(
        MockCommandRunner::new().on("-J", info_json(3 * 3600 + 1)),
        MockCaptionFetcher::unavailable(),
        MockRecognizer::new("mock"),
    );

    let err = s
        .service
        .transcribe(WATCH_URL, &TranscribeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, VidscribeError::DurationExceeded { .. }));
    assert!(err.is_client_error());
    assert_eq!(s.runner.invocations().len(), 1);
    assert_eq!(s.captions.call_count(), 0);
}

#[tokio::test]
async fn download_failure_is_reported() {
    let s = setup(
        MockCommandRunner::new()
            .on("-J", info_json(60))
            .fail_on("-o", "HTTP Error 403: Forbidden"),
        MockCaptionFetcher::failing("no captions endpoint"),
        MockRecognizer::new("mock"),
    );

    let err = s
        .service
        .transcribe(WATCH_URL, &TranscribeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, VidscribeError::Download { .. }));
    assert!(!err.is_client_error());
    assert_eq!(s.recognizer.call_count(), 0);
}

#[tokio::test]
async fn missing_url_is_rejected_without_lookups() {
    let s = setup(
        MockCommandRunner::new(),
        MockCaptionFetcher::unavailable(),
        MockRecognizer::new("mock"),
    );

    let err = s
        .service
        .transcribe("", &TranscribeOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Missing url");
    assert!(s.runner.invocations().is_empty());
}

#[test]
fn video_ids_from_common_url_shapes() {
    assert_eq!(
        extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
        Some("dQw4w9WgXcQ")
    );
    assert_eq!(
        extract_video_id(WATCH_URL).as_deref(),
        Some("dQw4w9WgXcQ")
    );
    assert_eq!(extract_video_id("https://example.com/video.mp4"), None);
}
