//! Speech synthesis backends.
//!
//! One backend instance renders one speech segment at a time; the audio
//! assembly stage drives it across a whole document.

pub mod azure;
pub mod vits;

use crate::config::{RenderConfig, SynthBackend};
use crate::error::Result;
use crate::markup::Rate;
use async_trait::async_trait;

pub use azure::AzureTts;
pub use vits::VitsSynth;

/// Synthesis backend contract. New backends only need to implement this trait.
#[async_trait]
pub trait SpeechSynthesizer: Send {
    /// Synthesize `text` at `rate` to f32 mono samples.
    ///
    /// Empty text yields an empty buffer, not an error.
    async fn synthesize(&mut self, text: &str, rate: Rate) -> Result<Vec<f32>>;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

/// Construct the backend selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend fails to initialize (missing model
/// files, missing API key).
pub fn from_config(config: &RenderConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    match config.synth.backend {
        SynthBackend::Vits => Ok(Box::new(VitsSynth::new(&config.synth)?)),
        SynthBackend::Azure => Ok(Box::new(AzureTts::new(&config.azure)?)),
    }
}
