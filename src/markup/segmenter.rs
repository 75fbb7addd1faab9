//! Markup segmenter: staged transformation of annotated text into segments.
//!
//! Three passes, each a single left-to-right scan over tag boundaries:
//! repeat expansion, rate-block extraction, pause splitting. Structurally
//! incomplete markup (an unterminated block, a tag name that is a prefix of
//! a longer word) passes through as literal text; only a complete repeat
//! block with a bad count or a pause marker with an unparseable duration
//! rejects the whole input.

use super::document::{Document, Rate, Segment};
use crate::error::MarkupError;

/// Tunables for the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterOptions {
    /// Silence duration used when a `<pause>` marker omits its `time`.
    pub default_pause_s: f32,
    /// Upper bound on the repeat-expanded text, in bytes.
    pub max_expansion_bytes: usize,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            default_pause_s: 1.0,
            max_expansion_bytes: 1 << 20,
        }
    }
}

/// Parse annotated text into an ordered document of synthesis instructions.
///
/// Empty input (after trimming) yields an empty document.
///
/// # Errors
///
/// Returns an error for a malformed repeat count, a malformed pause
/// duration, or a repeat expansion that exceeds the output bound. No
/// partial document is produced on error.
pub fn segment(input: &str) -> Result<Document, MarkupError> {
    segment_with(input, &SegmenterOptions::default())
}

/// [`segment`] with explicit options.
///
/// # Errors
///
/// Same conditions as [`segment`].
pub fn segment_with(input: &str, opts: &SegmenterOptions) -> Result<Document, MarkupError> {
    if input.trim().is_empty() {
        return Ok(Document::default());
    }

    let expanded = expand_repeats(input, opts.max_expansion_bytes)?;

    let mut segments = Vec::new();
    for (chunk, rate) in split_rate_blocks(&expanded) {
        split_pauses(chunk, rate, opts.default_pause_s, &mut segments)?;
    }
    Ok(Document::new(segments))
}

// ---------------------------------------------------------------------------
// Stage 1: repeat expansion
// ---------------------------------------------------------------------------

/// Replace each `<repeat times="N">inner</repeat>` block with the trimmed
/// inner text repeated `N` times, joined with single spaces.
fn expand_repeats(text: &str, max_bytes: usize) -> Result<String, MarkupError> {
    const OPEN: &str = "<repeat";
    const CLOSE: &str = "</repeat>";

    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0;
    let mut scan = 0;

    while let Some(found) = text[scan..].find(OPEN) {
        let open_at = scan + found;
        let tag_rest = &text[open_at + OPEN.len()..];

        let complete = tag_rest
            .find('>')
            .filter(|&end| name_ends_at(&tag_rest[..end]) && !tag_rest[..end].contains('<'))
            .and_then(|end| {
                let inner_start = open_at + OPEN.len() + end + 1;
                text[inner_start..]
                    .find(CLOSE)
                    .map(|close| (&tag_rest[..end], inner_start, inner_start + close))
            });

        let Some((tag_body, inner_start, inner_end)) = complete else {
            // Incomplete block: literal text, keep scanning past the name.
            scan = open_at + OPEN.len();
            continue;
        };

        let times = parse_times(tag_body)?;
        let inner = text[inner_start..inner_end].trim();

        out.push_str(&text[plain_start..open_at]);
        for i in 0..times {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(inner);
            if out.len() > max_bytes {
                return Err(MarkupError::ExpansionTooLarge { limit: max_bytes });
            }
        }

        plain_start = inner_end + CLOSE.len();
        scan = plain_start;
    }

    out.push_str(&text[plain_start..]);
    Ok(out)
}

/// Parse the `times` attribute of a repeat block.
///
/// A missing attribute, an unquoted value, or anything other than an
/// unsigned integer is fatal.
fn parse_times(tag_body: &str) -> Result<usize, MarkupError> {
    let raw = attr_value(tag_body, "times").ok_or_else(|| MarkupError::MalformedRepeatCount {
        found: tag_body.trim().to_owned(),
    })?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MarkupError::MalformedRepeatCount {
            found: raw.to_owned(),
        });
    }
    raw.parse().map_err(|_| MarkupError::MalformedRepeatCount {
        found: raw.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Stage 2: rate-block extraction
// ---------------------------------------------------------------------------

/// Split text into chunks annotated with their speaking rate.
///
/// Text outside any `<prosody rate="…">…</prosody>` block becomes a
/// `Normal` chunk; block contents carry the block's rate. Blocks do not
/// nest. Chunks appear in input order; empty chunks are filtered later by
/// the pause-splitting stage.
fn split_rate_blocks(text: &str) -> Vec<(&str, Rate)> {
    const OPEN: &str = "<prosody";
    const CLOSE: &str = "</prosody>";

    let mut chunks = Vec::new();
    let mut plain_start = 0;
    let mut scan = 0;

    while let Some(found) = text[scan..].find(OPEN) {
        let open_at = scan + found;
        let tag_rest = &text[open_at + OPEN.len()..];

        let complete = tag_rest
            .find('>')
            .filter(|&end| name_ends_at(&tag_rest[..end]) && !tag_rest[..end].contains('<'))
            .and_then(|end| {
                let inner_start = open_at + OPEN.len() + end + 1;
                text[inner_start..]
                    .find(CLOSE)
                    .map(|close| (&tag_rest[..end], inner_start, inner_start + close))
            });

        let Some((tag_body, inner_start, inner_end)) = complete else {
            scan = open_at + OPEN.len();
            continue;
        };

        if plain_start < open_at {
            chunks.push((&text[plain_start..open_at], Rate::Normal));
        }
        chunks.push((&text[inner_start..inner_end], parse_rate(tag_body)));

        plain_start = inner_end + CLOSE.len();
        scan = plain_start;
    }

    if plain_start < text.len() {
        chunks.push((&text[plain_start..], Rate::Normal));
    }
    chunks
}

/// Unknown or missing rate keywords fall back to `Normal`.
fn parse_rate(tag_body: &str) -> Rate {
    match attr_value(tag_body, "rate") {
        Some("slow") => Rate::Slow,
        Some("fast") => Rate::Fast,
        _ => Rate::Normal,
    }
}

// ---------------------------------------------------------------------------
// Stage 3: pause splitting
// ---------------------------------------------------------------------------

/// Split one rate-annotated chunk on `<pause/>` markers, pushing the
/// resulting speech and silence segments in order.
fn split_pauses(
    chunk: &str,
    rate: Rate,
    default_pause_s: f32,
    out: &mut Vec<Segment>,
) -> Result<(), MarkupError> {
    const OPEN: &str = "<pause";

    let mut plain_start = 0;
    let mut scan = 0;

    while let Some(found) = chunk[scan..].find(OPEN) {
        let open_at = scan + found;
        let tag_rest = &chunk[open_at + OPEN.len()..];

        let tag_end = tag_rest
            .find('>')
            .filter(|&end| name_ends_at(&tag_rest[..end]) && !tag_rest[..end].contains('<'));
        let Some(tag_end) = tag_end else {
            scan = open_at + OPEN.len();
            continue;
        };

        let Some(seconds) = parse_pause(&tag_rest[..tag_end], default_pause_s)? else {
            // Unrelated attributes: not a pause marker, keep it literal.
            scan = open_at + OPEN.len();
            continue;
        };

        push_speech(out, &chunk[plain_start..open_at], rate);
        out.push(Segment::Silence { seconds });

        plain_start = open_at + OPEN.len() + tag_end + 1;
        scan = plain_start;
    }

    push_speech(out, &chunk[plain_start..], rate);
    Ok(())
}

/// Parse a pause tag body.
///
/// Returns `Some(seconds)` for an empty body (default duration) or a valid
/// `time="Ns"` attribute, `None` when the body is something else entirely,
/// and an error when `time` is present but unparseable. Durations are
/// digits with an optional fractional part and an optional `s` suffix, so
/// they are always finite and non-negative.
fn parse_pause(tag_body: &str, default_pause_s: f32) -> Result<Option<f32>, MarkupError> {
    let body = tag_body.trim().trim_end_matches('/').trim_end();
    if body.is_empty() {
        return Ok(Some(default_pause_s));
    }
    // Only a `time` attribute makes this a pause marker; `time` must not be
    // a prefix of a longer attribute name (`timeout`).
    let is_time_attr = body
        .strip_prefix("time")
        .is_some_and(|rest| rest.trim_start().starts_with('='));
    if !is_time_attr {
        return Ok(None);
    }

    let Some(raw) = attr_value(body, "time") else {
        return Err(MarkupError::MalformedPauseDuration {
            found: body.to_owned(),
        });
    };

    let digits = raw.strip_suffix('s').unwrap_or(raw);
    let well_formed = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|&b| b == b'.').count() <= 1;
    if !well_formed {
        return Err(MarkupError::MalformedPauseDuration {
            found: raw.to_owned(),
        });
    }

    digits
        .parse()
        .map(Some)
        .map_err(|_| MarkupError::MalformedPauseDuration {
            found: raw.to_owned(),
        })
}

/// Push a speech segment if the text is non-empty after trimming.
fn push_speech(out: &mut Vec<Segment>, text: &str, rate: Rate) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(Segment::Speech {
            text: trimmed.to_owned(),
            rate,
        });
    }
}

// ---------------------------------------------------------------------------
// Shared tag helpers
// ---------------------------------------------------------------------------

/// A tag match is only genuine when the name is not a prefix of a longer
/// word (`<pause` must not match `<pauses>`).
fn name_ends_at(tag_body: &str) -> bool {
    tag_body.is_empty() || tag_body.starts_with([' ', '\t', '\n', '\r', '/'])
}

/// Extract the value of a `name="value"` attribute from a tag body.
///
/// Returns `None` when the attribute is absent or its value is not
/// double-quoted.
fn attr_value<'a>(tag_body: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag_body;
    while let Some(pos) = rest.find(name) {
        let after = rest[pos + name.len()..].trim_start();
        if let Some(eq_rest) = after.strip_prefix('=') {
            let value_rest = eq_rest.trim_start().strip_prefix('"')?;
            let end = value_rest.find('"')?;
            return Some(&value_rest[..end]);
        }
        rest = &rest[pos + name.len()..];
    }
    None
}
