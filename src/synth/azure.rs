//! Azure Cognitive Services speech backend.
//!
//! One HTTPS request per speech segment. The service is asked for raw
//! 16-bit PCM so segments can be concatenated with sample-accurate silence;
//! rate blocks become SSML `<prosody rate>` attributes on the wire.

use super::SpeechSynthesizer;
use crate::config::AzureConfig;
use crate::error::{RenderError, Result};
use crate::markup::Rate;
use async_trait::async_trait;
use tracing::{debug, info};

/// Environment variable holding the Azure speech subscription key.
pub const KEY_ENV_VAR: &str = "AZURE_SPEECH_KEY";

/// Azure TTS client.
pub struct AzureTts {
    client: reqwest::Client,
    endpoint: String,
    voice: String,
    key: String,
    output_format: &'static str,
    sample_rate: u32,
}

impl AzureTts {
    /// Create a client, reading the subscription key from `AZURE_SPEECH_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unset or the configured sample rate
    /// has no raw-PCM output format.
    pub fn new(config: &AzureConfig) -> Result<Self> {
        let key = std::env::var(KEY_ENV_VAR)
            .map_err(|_| RenderError::Config(format!("{KEY_ENV_VAR} is not set")))?;
        Self::with_key(config, key)
    }

    /// Create a client with an explicit subscription key.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured sample rate has no raw-PCM
    /// output format.
    pub fn with_key(config: &AzureConfig, key: String) -> Result<Self> {
        let output_format = format_for_sample_rate(config.sample_rate).ok_or_else(|| {
            RenderError::Config(format!(
                "no raw PCM output format for {} Hz (use 16000, 24000, or 48000)",
                config.sample_rate
            ))
        })?;

        let endpoint = config.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                config.region
            )
        });
        info!("Azure TTS ready (voice={}, {})", config.voice, endpoint);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            voice: config.voice.clone(),
            key,
            output_format,
            sample_rate: config.sample_rate,
        })
    }

    /// Build the SSML envelope for one speech segment.
    fn ssml_body(&self, text: &str, rate: Rate) -> String {
        let escaped = escape_xml(text);
        let inner = match rate {
            Rate::Normal => escaped,
            Rate::Slow => format!("<prosody rate=\"slow\">{escaped}</prosody>"),
            Rate::Fast => format!("<prosody rate=\"fast\">{escaped}</prosody>"),
        };
        format!(
            "<speak version='1.0' xml:lang='en-US'><voice name='{}'>{inner}</voice></speak>",
            self.voice
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureTts {
    async fn synthesize(&mut self, text: &str, rate: Rate) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.ssml_body(text, rate);
        debug!("requesting {} chars from Azure", text.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", self.output_format)
            .header("User-Agent", "speakdown")
            .body(body)
            .send()
            .await
            .map_err(|e| RenderError::Synth(format!("Azure request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RenderError::Synth(format!(
                "Azure responded with {status}: {detail}"
            )));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| RenderError::Synth(format!("failed to read Azure response: {e}")))?;

        let samples = decode_pcm16(&payload)?;
        info!(
            "Azure returned {} samples ({:.1}s audio)",
            samples.len(),
            samples.len() as f32 / self.sample_rate as f32
        );
        Ok(samples)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// The raw-PCM output format name for a sample rate, if the service has one.
fn format_for_sample_rate(sample_rate: u32) -> Option<&'static str> {
    match sample_rate {
        16_000 => Some("raw-16khz-16bit-mono-pcm"),
        24_000 => Some("raw-24khz-16bit-mono-pcm"),
        48_000 => Some("raw-48khz-16bit-mono-pcm"),
        _ => None,
    }
}

/// Decode little-endian 16-bit PCM to f32 samples in [-1, 1].
fn decode_pcm16(payload: &[u8]) -> Result<Vec<f32>> {
    if payload.len() % 2 != 0 {
        return Err(RenderError::Synth(format!(
            "PCM payload has odd length {}",
            payload.len()
        )));
    }
    Ok(payload
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32_768.0)
        .collect())
}

/// Escape text for inclusion in an SSML element.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
