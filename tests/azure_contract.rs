//! Azure backend contract tests.
//!
//! Verify the HTTP request shape (headers, SSML body) and response
//! handling against a mock server.

use speakdown::config::AzureConfig;
use speakdown::markup::Rate;
use speakdown::synth::AzureTts;
use speakdown::SpeechSynthesizer;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AzureConfig {
    AzureConfig {
        endpoint: Some(format!("{}/cognitiveservices/v1", server.uri())),
        ..AzureConfig::default()
    }
}

/// Little-endian PCM bytes for the given i16 samples.
fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Request format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn request_carries_subscription_key_and_format_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(header("Ocp-Apim-Subscription-Key", "contract-key"))
        .and(header("Content-Type", "application/ssml+xml"))
        .and(header("X-Microsoft-OutputFormat", "raw-24khz-16bit-mono-pcm"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pcm_bytes(&[0, 0])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "contract-key".into()).unwrap();
    let result = tts.synthesize("hello", Rate::Normal).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn request_body_wraps_text_in_ssml_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(body_string_contains("<speak version='1.0'"))
        .and(body_string_contains("<voice name='en-US-AriaNeural'>"))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pcm_bytes(&[0])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "k".into()).unwrap();
    tts.synthesize("hello world", Rate::Normal).await.unwrap();
}

#[tokio::test]
async fn slow_rate_becomes_prosody_attribute() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(body_string_contains("<prosody rate=\"slow\">take it easy</prosody>"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pcm_bytes(&[0])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "k".into()).unwrap();
    tts.synthesize("take it easy", Rate::Slow).await.unwrap();
}

// ────────────────────────────────────────────────────────────────────────────
// Response handling
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pcm_response_decodes_to_f32_samples() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(pcm_bytes(&[0, 16_384, -16_384])),
        )
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "k".into()).unwrap();
    let samples = tts.synthesize("abc", Rate::Normal).await.unwrap();

    assert_eq!(samples.len(), 3);
    assert!((samples[0] - 0.0).abs() < 1e-6);
    assert!((samples[1] - 0.5).abs() < 1e-6);
    assert!((samples[2] + 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn empty_text_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "k".into()).unwrap();
    let samples = tts.synthesize("", Rate::Normal).await.unwrap();
    assert!(samples.is_empty());
}

#[tokio::test]
async fn error_status_surfaces_code_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid subscription key"))
        .mount(&mock_server)
        .await;

    let mut tts = AzureTts::with_key(&config_for(&mock_server), "bad-key".into()).unwrap();
    let err = tts.synthesize("hello", Rate::Normal).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "missing status in: {message}");
    assert!(
        message.contains("invalid subscription key"),
        "missing body in: {message}"
    );
}
