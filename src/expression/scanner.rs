//! Single-pass character scanner
//!
//! Finds the parenthesis pairs that delimit real sub-expressions, skipping
//! quoted literals, escaped characters and function-call parentheses, and
//! masks literals and call arguments so operator tokens inside them cannot be
//! mistaken for syntax.
//!
//! All syntax characters are ASCII, so the scan works on bytes and every
//! reported index is a valid `str` boundary.

use crate::config::{TokenPatterns, DEFAULT_PATTERNS};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"));

/// Byte offsets of a matched `(` and `)`, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParenPair {
    pub start: usize,
    pub end: usize,
}

/// Text with literal spans replaced by `{N}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// The text with every removed span replaced by its placeholder
    pub text: String,
    /// Removed spans, indexed by placeholder number
    pub removed: Vec<String>,
}

impl MaskedText {
    /// Put the removed spans back into `masked`, which may be any slice of
    /// [`MaskedText::text`]
    pub fn restore(&self, masked: &str) -> String {
        restore_literals(masked, &self.removed)
    }
}

/// Whether the character at `index` is escaped: preceded by an odd-length
/// run of backslashes
pub fn is_escaped(text: &str, index: usize) -> bool {
    text.as_bytes()[..index.min(text.len())]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Tracks the backslash run preceding the current byte
#[derive(Default)]
struct EscapeTracker {
    run: usize,
}

impl EscapeTracker {
    /// Feed the next byte; returns whether that byte is escaped
    #[inline]
    fn next(&mut self, byte: u8) -> bool {
        let escaped = self.run % 2 == 1;
        self.run = if byte == b'\\' { self.run + 1 } else { 0 };
        escaped
    }
}

/// Top-level sub-expression parenthesis pairs, using the default tokens
pub fn find_top_level_parenthesis(text: &str) -> Vec<ParenPair> {
    find_top_level_parenthesis_with(text, &DEFAULT_PATTERNS)
}

/// Top-level sub-expression parenthesis pairs
///
/// Unmatched opening parentheses never produce a pair and stray closing
/// parentheses are ignored.
pub fn find_top_level_parenthesis_with(text: &str, patterns: &TokenPatterns) -> Vec<ParenPair> {
    let bytes = text.as_bytes();
    let mut escapes = EscapeTracker::default();
    let mut quote: Option<u8> = None;
    let mut conditional_depth = 0usize;
    let mut function_call_depth = 0usize;
    let mut start = 0usize;
    let mut pairs = Vec::new();

    for (i, &byte) in bytes.iter().enumerate() {
        if escapes.next(byte) {
            continue;
        }

        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => {
                if function_call_depth > 0 || !patterns.opens_sub_expression(&text[..=i]) {
                    function_call_depth += 1;
                } else {
                    if conditional_depth == 0 {
                        start = i;
                    }
                    conditional_depth += 1;
                }
            }
            b')' => {
                if function_call_depth > 0 {
                    function_call_depth -= 1;
                } else if conditional_depth > 0 {
                    conditional_depth -= 1;
                    if conditional_depth == 0 {
                        pairs.push(ParenPair { start, end: i });
                    }
                }
            }
            _ => {}
        }
    }

    tracing::trace!(text, pairs = pairs.len(), "scanned top-level parenthesis");
    pairs
}

/// Exclusive end of the span opened by the byte at `start` (a quote, `(` or
/// `{`) and whether it was closed. An unclosed span runs to the end.
fn span_end(bytes: &[u8], start: usize) -> (usize, bool) {
    let open = bytes[start];
    let close = match open {
        b'(' => b')',
        b'{' => b'}',
        quote => quote,
    };
    let is_quote = open == b'\'' || open == b'"';

    let mut escapes = EscapeTracker::default();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let i = start + offset;
        if escapes.next(byte) {
            continue;
        }

        if is_quote {
            if i > start && byte == close {
                return (i + 1, true);
            }
            continue;
        }

        if let Some(q) = quote {
            if byte == q {
                quote = None;
            }
            continue;
        }

        if byte == b'\'' || byte == b'"' {
            quote = Some(byte);
        } else if byte == open {
            depth += 1;
        } else if byte == close {
            depth -= 1;
            if depth == 0 {
                return (i + 1, true);
            }
        }
    }

    (bytes.len(), false)
}

/// Index of the `)` matching the `(` at `open`, honouring quotes and escapes
pub(crate) fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    match span_end(bytes, open) {
        (end, true) => Some(end - 1),
        _ => None,
    }
}

/// Mask literals using the default tokens
pub fn remove_literals(text: &str) -> MaskedText {
    remove_literals_with(text, &DEFAULT_PATTERNS)
}

/// Replace quoted literals, `{}` blocks and function-call argument lists by
/// `{N}` placeholders
///
/// Sub-expression parentheses stay in place; only the spans inside them are
/// masked. An unterminated span runs to the end of the text. Every `{` left
/// in the masked text starts a placeholder, which keeps
/// [`restore_literals`] lossless.
pub fn remove_literals_with(text: &str, patterns: &TokenPatterns) -> MaskedText {
    let bytes = text.as_bytes();
    let mut masked = String::with_capacity(text.len());
    let mut removed = Vec::new();
    let mut escapes = EscapeTracker::default();
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let byte = bytes[i];
        let escaped = escapes.next(byte);

        let starts_span = match byte {
            b'{' => true,
            b'\'' | b'"' => !escaped,
            b'(' => !escaped && !patterns.opens_sub_expression(&text[..=i]),
            _ => false,
        };

        if starts_span {
            let (end, _) = span_end(bytes, i);
            masked.push_str(&text[copied..i]);
            masked.push_str(&format!("{{{}}}", removed.len()));
            removed.push(text[i..end].to_string());
            copied = end;
            i = end;
            escapes = EscapeTracker::default();
        } else {
            i += 1;
        }
    }
    masked.push_str(&text[copied..]);

    MaskedText {
        text: masked,
        removed,
    }
}

/// Reverse [`remove_literals`] in one substitution pass
///
/// Removed spans never contain placeholders of their own, so a single pass
/// restores everything; text inside a span that happens to look like a
/// placeholder is left alone.
pub fn restore_literals(masked: &str, removed: &[String]) -> String {
    PLACEHOLDER
        .replace_all(masked, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| removed.get(n))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
