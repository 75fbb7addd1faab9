//! Error types for the rendering pipeline.

/// Errors raised while parsing speech markup.
///
/// These are fatal for the whole input: no partial document is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// A `<repeat>` block whose `times` attribute is missing or not an integer.
    #[error("malformed repeat count: {found:?}")]
    MalformedRepeatCount {
        /// The offending attribute text.
        found: String,
    },

    /// A `<pause>` marker whose `time` attribute is present but unparseable.
    #[error("malformed pause duration: {found:?}")]
    MalformedPauseDuration {
        /// The offending attribute text.
        found: String,
    },

    /// Repeat expansion would exceed the configured output bound.
    #[error("repeat expansion exceeds {limit} bytes")]
    ExpansionTooLarge {
        /// The configured byte limit.
        limit: usize,
    },
}

/// Top-level error type for the rendering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Speech markup parse error.
    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Speech synthesis error.
    #[error("synthesis error: {0}")]
    Synth(String),

    /// Audio assembly or output error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RenderError>;
