//! Configuration types for the rendering pipeline.

use crate::markup::SegmenterOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for markup rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Markup segmenter settings.
    pub markup: MarkupConfig,
    /// Local synthesis settings.
    pub synth: SynthConfig,
    /// Azure cloud backend settings.
    pub azure: AzureConfig,
}

/// Markup segmenter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Silence duration for a `<pause>` marker without a `time` attribute.
    pub default_pause_s: f32,
    /// Upper bound on repeat-expanded text, in bytes.
    pub max_expansion_bytes: usize,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        let defaults = SegmenterOptions::default();
        Self {
            default_pause_s: defaults.default_pause_s,
            max_expansion_bytes: defaults.max_expansion_bytes,
        }
    }
}

impl MarkupConfig {
    /// Segmenter options carrying these settings.
    pub fn options(&self) -> SegmenterOptions {
        SegmenterOptions {
            default_pause_s: self.default_pause_s,
            max_expansion_bytes: self.max_expansion_bytes,
        }
    }
}

/// Synthesis backend selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthBackend {
    /// Local VITS ONNX inference.
    #[default]
    Vits,
    /// Azure Cognitive Services speech API.
    Azure,
}

/// Local synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Which synthesis backend to use.
    pub backend: SynthBackend,
    /// Directory containing `model.onnx` and its Coqui-style `config.json`.
    pub model_dir: PathBuf,
    /// Base VITS length scale; rate blocks adjust it by ±0.3.
    pub base_length_scale: f32,
    /// VITS noise scale.
    pub noise_scale: f32,
    /// VITS duration-predictor noise scale.
    pub noise_scale_w: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            backend: SynthBackend::default(),
            model_dir: PathBuf::from("models/vits"),
            base_length_scale: 1.2,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
        }
    }
}

/// Azure cloud backend configuration.
///
/// The subscription key is read from the `AZURE_SPEECH_KEY` environment
/// variable, never from config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Azure region of the speech resource (e.g. "eastus").
    pub region: String,
    /// Neural voice name.
    pub voice: String,
    /// Output sample rate in Hz; must be one the raw-PCM formats support
    /// (16000, 24000, or 48000).
    pub sample_rate: u32,
    /// Full endpoint URL override (defaults to the regional endpoint).
    pub endpoint: Option<String>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            region: "centralindia".to_owned(),
            voice: "en-US-AriaNeural".to_owned(),
            sample_rate: 24_000,
            endpoint: None,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::RenderError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RenderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/speakdown/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("speakdown").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("speakdown")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/speakdown-config/config.toml")
        }
    }
}
