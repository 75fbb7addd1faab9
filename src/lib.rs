//! Speakdown: markup-driven text-to-speech rendering.
//!
//! Renders annotated text to a single WAV file through a pipeline of
//! independent stages:
//!
//! Markup → Segments → Synthesis → Assembly → WAV
//!
//! # Architecture
//!
//! - **Markup segmenter**: parses `<repeat>`, `<prosody rate>` and
//!   `<pause>` tags into an ordered [`Document`] of speech and silence
//!   segments
//! - **Synthesis**: pluggable backends render one speech segment at a time
//!   (local VITS ONNX via `ort`, or the Azure speech API)
//! - **Assembly**: concatenates synthesized segments and exact silence in
//!   input order
//! - **Output**: 16-bit PCM WAV via `hound`

pub mod audio;
pub mod config;
pub mod error;
pub mod markup;
pub mod synth;

pub use config::RenderConfig;
pub use error::{MarkupError, RenderError, Result};
pub use markup::{Document, Rate, Segment, segment};
pub use synth::SpeechSynthesizer;
