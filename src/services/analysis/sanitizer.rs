//! Response Sanitizer
//!
//! Turns raw completion text into a JSON value:
//!
//! 1. strip a wrapping markdown code fence
//! 2. pick the longest top-level `{...}` span (an unterminated trailing span
//!    counts, so truncated output is still a candidate)
//! 3. strict parse, and on failure run the repair chain and parse again
//!
//! Every repair works only outside string literals and only ever inserts or
//! drops separators; text inside strings is never touched.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Why a completion could not be turned into JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// The text contains no `{` at all.
    #[error("no JSON object found in response")]
    NoJsonFound,
    /// A candidate was found but still failed to parse after repair.
    #[error("invalid JSON after repair: {message}")]
    InvalidJson { message: String, candidate: String },
}

/// Sanitize a raw completion into a JSON value.
pub fn sanitize_response(raw: &str) -> Result<Value, SanitizeError> {
    let unfenced = strip_code_fence(raw);
    let candidate = extract_json_candidate(unfenced).ok_or(SanitizeError::NoJsonFound)?;

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(value);
    }

    let repaired = repair_json(candidate);
    serde_json::from_str::<Value>(&repaired).map_err(|e| SanitizeError::InvalidJson {
        message: e.to_string(),
        candidate: repaired,
    })
}

// ============================================================================
// Fence stripping and candidate extraction
// ============================================================================

/// Remove a wrapping ``` fence (optionally tagged, e.g. ```json).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip a language tag on the opening line.
    let tag_len = after_open
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_open.len());
    let body = after_open[tag_len..].trim_start();
    body.strip_suffix("```").unwrap_or(body).trim_end()
}

/// Find the longest top-level brace span. Balanced spans and one unterminated
/// trailing span are candidates; ties go to the earliest span.
pub fn extract_json_candidate(text: &str) -> Option<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if depth == 0 {
            if c == '{' {
                depth = 1;
                start = i;
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        spans.push((start, text.len()));
    }

    let mut best: Option<(usize, usize)> = None;
    for span in spans {
        let longer = best.map_or(true, |(s, e)| span.1 - span.0 > e - s);
        if longer {
            best = Some(span);
        }
    }
    best.map(|(s, e)| &text[s..e])
}

// ============================================================================
// Repair chain
// ============================================================================

struct RepairRules {
    trailing_comma: Regex,
    adjacent_objects: Regex,
    adjacent_arrays: Regex,
    bare_key: Regex,
}

/// Compiled once; `None` would only mean a pattern failed to compile, in
/// which case the regex-based repairs are skipped.
fn rules() -> Option<&'static RepairRules> {
    static RULES: OnceLock<Option<RepairRules>> = OnceLock::new();
    RULES
        .get_or_init(|| {
            Some(RepairRules {
                trailing_comma: Regex::new(r",(?:\s*,)*(\s*[}\]])").ok()?,
                adjacent_objects: Regex::new(r"\}(\s*)\{").ok()?,
                adjacent_arrays: Regex::new(r"\](\s*)\[").ok()?,
                bare_key: Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)").ok()?,
            })
        })
        .as_ref()
}

/// Apply the repair chain: trailing commas, missing commas between adjacent
/// objects/arrays, bare keys, missing closers, then trailing commas again
/// (closing a truncated body can expose one).
pub fn repair_json(candidate: &str) -> String {
    let mut text = candidate.to_string();
    if let Some(rules) = rules() {
        text = remove_trailing_commas(&text, rules);
        text = map_outside_strings(&text, |seg| {
            let seg = rules.adjacent_objects.replace_all(seg, "},${1}{");
            rules
                .adjacent_arrays
                .replace_all(&seg, "],${1}[")
                .into_owned()
        });
        text = map_outside_strings(&text, |seg| {
            rules.bare_key.replace_all(seg, "${1}\"${2}\"${3}").into_owned()
        });
    }

    text = close_unterminated(&text);

    if let Some(rules) = rules() {
        text = remove_trailing_commas(&text, rules);
    }
    text
}

fn remove_trailing_commas(text: &str, rules: &RepairRules) -> String {
    map_outside_strings(text, |seg| {
        rules.trailing_comma.replace_all(seg, "${1}").into_owned()
    })
}

/// Rewrite only the parts of `text` that lie outside string literals.
/// String literals (quotes included) are copied through unchanged.
fn map_outside_strings<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len() + 16);
    let mut seg_start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                out.push_str(&text[seg_start..=i]);
                seg_start = i + 1;
            }
        } else if c == '"' {
            out.push_str(&f(&text[seg_start..i]));
            in_string = true;
            seg_start = i;
        }
    }

    let tail = &text[seg_start..];
    if in_string {
        out.push_str(tail);
    } else {
        out.push_str(&f(tail));
    }
    out
}

/// Append whatever is needed to close an open string and any open
/// objects/arrays, innermost first. Nothing is ever removed.
fn close_unterminated(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    if in_string {
        if escaped {
            out.push('\\');
        }
        out.push('"');
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}
