//! VITS ONNX inference engine.
//!
//! Single-model TTS: grapheme encoding → ONNX inference → mono audio at the
//! model's sample rate. The grapheme vocabulary comes from the Coqui-style
//! `config.json` shipped next to the ONNX export, so no separate tokenizer
//! file is needed.

use super::SpeechSynthesizer;
use crate::config::SynthConfig;
use crate::error::{RenderError, Result};
use crate::markup::Rate;
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// VITS TTS engine.
///
/// Wraps a single ONNX session and the grapheme vocabulary. Synthesizes
/// text to f32 mono audio at the sample rate declared by the model config.
pub struct VitsSynth {
    session: Session,
    vocab: GraphemeVocab,
    sample_rate: u32,
    base_length_scale: f32,
    noise_scale: f32,
    noise_scale_w: f32,
}

impl VitsSynth {
    /// Load the engine from `model.onnx` + `config.json` in `model_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or malformed, or if the
    /// ONNX session cannot be created.
    pub fn new(config: &SynthConfig) -> Result<Self> {
        let model_path = config.model_dir.join("model.onnx");
        let config_path = config.model_dir.join("config.json");

        info!("loading VITS model config: {}", config_path.display());
        let model_config = load_model_config(&config_path)?;
        let vocab = GraphemeVocab::from_model_config(&model_config);

        info!("loading VITS ONNX model: {}", model_path.display());
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(&model_path))
            .map_err(|e| RenderError::Synth(format!("failed to load VITS ONNX model: {e}")))?;

        info!(
            "VITS ready ({} graphemes, {} Hz)",
            vocab.len(),
            model_config.audio.sample_rate
        );

        Ok(Self {
            session,
            vocab,
            sample_rate: model_config.audio.sample_rate,
            base_length_scale: config.base_length_scale,
            noise_scale: config.noise_scale,
            noise_scale_w: config.noise_scale_w,
        })
    }

    /// Run a single ONNX inference call with the standard VITS signature.
    fn run_inference(&mut self, ids: &[i64], scales: [f32; 3]) -> Result<Vec<f32>> {
        use ort::session::{SessionInputValue, SessionInputs};

        let seq_len = ids.len();

        // input: shape [1, seq_len]
        let input = Tensor::from_array(([1_usize, seq_len], ids.to_vec()))
            .map_err(|e| RenderError::Synth(format!("failed to create input tensor: {e}")))?;

        // input_lengths: shape [1]
        let input_lengths = Tensor::from_array(([1_usize], vec![seq_len as i64]))
            .map_err(|e| RenderError::Synth(format!("failed to create lengths tensor: {e}")))?;

        // scales: shape [3] (noise_scale, length_scale, noise_scale_w)
        let scales_tensor = Tensor::from_array(([3_usize], scales.to_vec()))
            .map_err(|e| RenderError::Synth(format!("failed to create scales tensor: {e}")))?;

        let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
        feed.insert("input".to_string(), input.into());
        feed.insert("input_lengths".to_string(), input_lengths.into());
        feed.insert("scales".to_string(), scales_tensor.into());

        let outputs = self
            .session
            .run(SessionInputs::from(feed))
            .map_err(|e| RenderError::Synth(format!("ONNX inference failed: {e}")))?;

        let output_value = &outputs[0_usize];
        let (_shape, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| RenderError::Synth(format!("failed to extract output tensor: {e}")))?;

        Ok(data.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for VitsSynth {
    /// Synthesize text to audio samples.
    ///
    /// Uses `block_in_place` since ONNX inference is synchronous.
    async fn synthesize(&mut self, text: &str, rate: Rate) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let start = std::time::Instant::now();

        let ids = self.vocab.encode(text);
        if ids.is_empty() {
            debug!("no encodable graphemes in \"{text}\", skipping");
            return Ok(Vec::new());
        }

        let scales = [
            self.noise_scale,
            rate.length_scale(self.base_length_scale),
            self.noise_scale_w,
        ];

        let samples = tokio::task::block_in_place(|| self.run_inference(&ids, scales))?;

        let elapsed = start.elapsed();
        let max_amp = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        info!(
            "synthesized {} samples ({:.1}s audio) in {:.0}ms — max_amp={:.4}",
            samples.len(),
            samples.len() as f32 / self.sample_rate as f32,
            elapsed.as_millis(),
            max_amp,
        );

        Ok(samples)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

// ---------------------------------------------------------------------------
// Model config and grapheme vocabulary
// ---------------------------------------------------------------------------

/// The slice of a Coqui-style VITS `config.json` this engine needs.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelConfigFile {
    pub audio: AudioSection,
    pub characters: CharactersSection,
    #[serde(default = "default_add_blank")]
    pub add_blank: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioSection {
    pub sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CharactersSection {
    #[serde(default)]
    pub pad: String,
    #[serde(default)]
    pub punctuations: String,
    pub characters: String,
}

fn default_add_blank() -> bool {
    true
}

fn load_model_config(path: &Path) -> Result<ModelConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        RenderError::Synth(format!(
            "failed to read model config {}: {e}",
            path.display()
        ))
    })?;
    parse_model_config(&raw)
}

pub(crate) fn parse_model_config(raw: &str) -> Result<ModelConfigFile> {
    serde_json::from_str(raw)
        .map_err(|e| RenderError::Synth(format!("failed to parse model config: {e}")))
}

/// Character → token-id map in the Coqui grapheme layout:
/// pad, punctuations, characters, then a trailing blank id.
pub(crate) struct GraphemeVocab {
    ids: HashMap<char, i64>,
    blank_id: i64,
    add_blank: bool,
}

impl GraphemeVocab {
    pub(crate) fn from_model_config(config: &ModelConfigFile) -> Self {
        let mut ids = HashMap::new();
        for ch in config
            .characters
            .pad
            .chars()
            .chain(config.characters.punctuations.chars())
            .chain(config.characters.characters.chars())
        {
            // A character duplicated across sections keeps its first id.
            let next = ids.len() as i64;
            ids.entry(ch).or_insert(next);
        }
        Self {
            blank_id: ids.len() as i64,
            ids,
            add_blank: config.add_blank,
        }
    }

    /// Encode text to token ids, interleaving the blank id when the model
    /// was trained with `add_blank`. Characters outside the vocabulary are
    /// dropped.
    pub(crate) fn encode(&self, text: &str) -> Vec<i64> {
        let known: Vec<i64> = text.chars().filter_map(|ch| self.ids.get(&ch)).copied().collect();
        if known.is_empty() {
            return Vec::new();
        }
        if !self.add_blank {
            return known;
        }
        let mut out = Vec::with_capacity(known.len() * 2 + 1);
        out.push(self.blank_id);
        for id in known {
            out.push(id);
            out.push(self.blank_id);
        }
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
