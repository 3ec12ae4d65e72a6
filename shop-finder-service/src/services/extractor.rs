//! Locates and parses the JSON payload embedded in free-form model output.
//!
//! Two strategies are available:
//!
//! - [`ExtractionMode::Balanced`] pairs every `{` / `[` with its closer in a
//!   single pass that skips over string literals, then returns the leftmost
//!   pair that parses. A payload whose opener never closes is malformed.
//! - [`ExtractionMode::Greedy`] applies the `\{.*\}|\[.*\]` pattern across
//!   line breaks and parses that single match. Nested or trailing brackets
//!   can stretch the match past the payload; kept for compatibility.
//!
//! Both are pure functions of the input text.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Balanced,
    Greedy,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Balanced => "balanced",
            ExtractionMode::Greedy => "greedy",
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(ExtractionMode::Balanced),
            "greedy" => Ok(ExtractionMode::Greedy),
            other => Err(anyhow::anyhow!(
                "unknown extraction mode '{}', expected 'balanced' or 'greedy'",
                other
            )),
        }
    }
}

/// Why no JSON value could be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no JSON object or array found in text")]
    NotFound,

    #[error("JSON-like text could not be parsed: {0}")]
    Malformed(String),
}

impl ExtractionError {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "not_found",
            ExtractionError::Malformed(_) => "malformed",
        }
    }
}

/// Extract the first JSON object or array embedded in `text`.
pub fn extract_json(text: &str, mode: ExtractionMode) -> Result<Value, ExtractionError> {
    match mode {
        ExtractionMode::Balanced => extract_balanced(text),
        ExtractionMode::Greedy => extract_greedy(text),
    }
}

fn greedy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("static pattern compiles"))
}

fn extract_greedy(text: &str) -> Result<Value, ExtractionError> {
    let candidate = greedy_pattern()
        .find(text)
        .ok_or(ExtractionError::NotFound)?;

    serde_json::from_str(candidate.as_str()).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

fn extract_balanced(text: &str) -> Result<Value, ExtractionError> {
    let scan = scan_brackets(text.as_bytes());
    let mut last_error = None;

    for &(start, end) in &scan.spans {
        // Brackets are ASCII, so both ends sit on char boundaries.
        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    if let Some(open) = scan.unclosed {
        return Err(ExtractionError::Malformed(format!(
            "'{}' at byte {} is never closed",
            char::from(text.as_bytes()[open]),
            open
        )));
    }

    Err(match last_error {
        Some(reason) => ExtractionError::Malformed(reason),
        None => ExtractionError::NotFound,
    })
}

/// Bracket pairs found in one pass over the text.
struct BracketScan {
    /// `(open, close)` byte offsets, ordered by `open`.
    spans: Vec<(usize, usize)>,
    /// Earliest opener still waiting for its closer at end of text.
    unclosed: Option<usize>,
}

/// Pair every `{`/`[` with its closer using a single stack, skipping over
/// string literals. A closer of the wrong kind discards every opener still on
/// the stack. Spans that start after an opener that never closes are dropped:
/// they sit inside a truncated payload and are not the answer on their own.
fn scan_brackets(bytes: &[u8]) -> BracketScan {
    let mut stack: Vec<(usize, u8)> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            // Quotes only matter inside a candidate.
            b'"' if !stack.is_empty() => in_string = true,
            b'{' => stack.push((index, b'}')),
            b'[' => stack.push((index, b']')),
            b'}' | b']' => match stack.pop() {
                Some((open, close)) if close == byte => spans.push((open, index)),
                Some(_) => stack.clear(),
                None => {}
            },
            _ => {}
        }
    }

    let unclosed = stack.first().map(|&(open, _)| open);
    if let Some(cutoff) = unclosed {
        spans.retain(|&(open, _)| open < cutoff);
    }
    spans.sort_unstable_by_key(|&(open, _)| open);

    BracketScan { spans, unclosed }
}
