//! Speech markup parsing.
//!
//! Transforms annotated text (`<repeat times="N">…</repeat>`,
//! `<prosody rate="slow|fast">…</prosody>`, `<pause time="Ns"/>`) into an
//! ordered [`Document`] of speech and silence segments for the audio
//! assembly stage.

mod document;
mod segmenter;

pub use document::{Document, Rate, Segment};
pub use segmenter::{SegmenterOptions, segment, segment_with};
