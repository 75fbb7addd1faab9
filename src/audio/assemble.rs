//! Ordered assembly of a parsed document into one sample buffer.

use crate::error::Result;
use crate::markup::{Document, Segment};
use crate::synth::SpeechSynthesizer;
use tracing::{debug, info};

/// Render a document to a single mono sample buffer.
///
/// Speech segments are synthesized in order; silence segments become runs
/// of zero samples at the synthesizer's sample rate. Segment order equals
/// input order.
///
/// # Errors
///
/// Returns the first synthesis error; nothing is retried.
pub async fn render(doc: &Document, synth: &mut dyn SpeechSynthesizer) -> Result<Vec<f32>> {
    let sample_rate = synth.sample_rate();
    let mut out = Vec::new();

    for (idx, segment) in doc.segments().iter().enumerate() {
        match segment {
            Segment::Speech { text, rate } => {
                debug!("segment {idx}: speech ({rate:?}, {} chars)", text.len());
                let samples = synth.synthesize(text, *rate).await?;
                out.extend_from_slice(&samples);
            }
            Segment::Silence { seconds } => {
                let count = silence_samples(*seconds, sample_rate);
                debug!("segment {idx}: {seconds}s silence ({count} samples)");
                out.resize(out.len() + count, 0.0);
            }
        }
    }

    info!(
        "rendered {} segments to {} samples ({:.1}s)",
        doc.len(),
        out.len(),
        out.len() as f32 / sample_rate as f32
    );
    Ok(out)
}

/// Number of zero samples for `seconds` of silence at `sample_rate`.
fn silence_samples(seconds: f32, sample_rate: u32) -> usize {
    (seconds * sample_rate as f32).round() as usize
}
