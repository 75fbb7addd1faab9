//! WAV file output.

use crate::error::{RenderError, Result};
use std::path::Path;

/// Write f32 mono samples as a 16-bit PCM WAV file.
///
/// Samples are clamped to [-1, 1] before scaling.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_wav_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| RenderError::Audio(format!("failed to create wav writer: {e}")))?;

    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let v = (clamped * i16::MAX as f32).round() as i16;
        writer
            .write_sample(v)
            .map_err(|e| RenderError::Audio(format!("failed to write wav sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| RenderError::Audio(format!("failed to finalize wav: {e}")))?;
    Ok(())
}
