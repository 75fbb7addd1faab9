//! End-to-end rendering pipeline tests.
//!
//! Drives markup parsing, assembly, and WAV output with a deterministic
//! in-test synthesizer, so the full pipeline is exercised without model
//! weights or network access.

use async_trait::async_trait;
use speakdown::audio::{self, AudioStats};
use speakdown::markup::{Rate, Segment, segment};
use speakdown::{Result, SpeechSynthesizer};

/// Samples emitted per input character.
const SAMPLES_PER_CHAR: usize = 100;

/// Test sample rate in Hz.
const SAMPLE_RATE: u32 = 1_000;

/// Deterministic synthesizer: `SAMPLES_PER_CHAR` samples of a fixed
/// amplitude per character, amplitude keyed to the requested rate so tests
/// can tell segments apart in the output buffer.
struct ScriptedSynth {
    calls: Vec<(String, Rate)>,
}

impl ScriptedSynth {
    fn new() -> Self {
        Self { calls: Vec::new() }
    }

    fn amplitude(rate: Rate) -> f32 {
        match rate {
            Rate::Normal => 0.2,
            Rate::Slow => 0.4,
            Rate::Fast => 0.8,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynth {
    async fn synthesize(&mut self, text: &str, rate: Rate) -> Result<Vec<f32>> {
        self.calls.push((text.to_owned(), rate));
        Ok(vec![
            Self::amplitude(rate);
            text.chars().count() * SAMPLES_PER_CHAR
        ])
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

#[tokio::test]
async fn renders_segments_in_input_order() {
    let doc = segment(r#"ab <pause time="2s"/> <prosody rate="slow">cd</prosody>"#).unwrap();
    let mut synth = ScriptedSynth::new();
    let samples = audio::render(&doc, &mut synth).await.unwrap();

    // "ab" → 200 samples at 0.2, 2 s silence → 2000 zeros, "cd" → 200 at 0.4.
    assert_eq!(samples.len(), 200 + 2_000 + 200);
    assert!(samples[..200].iter().all(|&s| s == 0.2));
    assert!(samples[200..2_200].iter().all(|&s| s == 0.0));
    assert!(samples[2_200..].iter().all(|&s| s == 0.4));

    assert_eq!(
        synth.calls,
        vec![("ab".to_owned(), Rate::Normal), ("cd".to_owned(), Rate::Slow)]
    );
}

#[tokio::test]
async fn repeat_expansion_reaches_the_synthesizer_expanded() {
    let doc = segment(r#"<repeat times="3">hey</repeat>"#).unwrap();
    let mut synth = ScriptedSynth::new();
    audio::render(&doc, &mut synth).await.unwrap();

    assert_eq!(synth.calls, vec![("hey hey hey".to_owned(), Rate::Normal)]);
}

#[tokio::test]
async fn rendered_audio_round_trips_through_wav() {
    let doc = segment(r#"hi <pause time="1s"/> there"#).unwrap();
    let mut synth = ScriptedSynth::new();
    let samples = audio::render(&doc, &mut synth).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.wav");
    audio::write_wav_mono(&path, &samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
    assert_eq!(reader.len() as usize, samples.len());
}

#[tokio::test]
async fn stats_reflect_rendered_silence() {
    let doc = segment(r#"<pause time="2s"/>"#).unwrap();
    let mut synth = ScriptedSynth::new();
    let samples = audio::render(&doc, &mut synth).await.unwrap();

    let stats = AudioStats::measure(&samples, SAMPLE_RATE);
    assert_eq!(stats.samples, 2_000);
    assert!((stats.duration_s - 2.0).abs() < 1e-6);
    assert_eq!(stats.peak, 0.0);
    assert_eq!(stats.nan_count, 0);
}

#[tokio::test]
async fn fast_rate_is_passed_through() {
    let doc = segment(r#"<prosody rate="fast">quick</prosody>"#).unwrap();
    assert_eq!(
        doc.segments(),
        &[Segment::Speech {
            text: "quick".to_owned(),
            rate: Rate::Fast,
        }]
    );

    let mut synth = ScriptedSynth::new();
    let samples = audio::render(&doc, &mut synth).await.unwrap();
    assert!(samples.iter().all(|&s| s == 0.8));
}

#[tokio::test]
async fn malformed_markup_renders_nothing() {
    let result = segment(r#"ok <pause time="oops"/>"#);
    assert!(result.is_err());
}
