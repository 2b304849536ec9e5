//! Best-effort repair of near-miss JSON produced by language models.
//!
//! Tool-call argument strings frequently arrive with trailing commas, unquoted
//! keys, single-quoted strings, Python literals, markdown fences or a missing
//! closing brace. [`JsonRepair`] turns such text into something `serde_json`
//! accepts, or gives up.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```").expect("valid regex"));

/// Normalization step applied to argument strings that fail strict parsing.
pub trait JsonRepair: Send + Sync {
    /// Rewrite `input` into candidate JSON text, or `None` when nothing can be recovered.
    fn repair(&self, input: &str) -> Option<String>;
}

/// Default heuristics: fence stripping, region extraction, and a single
/// scanning pass that fixes quoting, literals, trailing commas and unbalanced
/// brackets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestEffortRepair;

impl JsonRepair for BestEffortRepair {
    fn repair(&self, input: &str) -> Option<String> {
        let text = strip_code_fence(input.trim());
        let region = extract_json_region(text)?;
        Some(normalize(region))
    }
}

/// Repair that never recovers anything; strict parsing only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepair;

impl JsonRepair for NoRepair {
    fn repair(&self, _input: &str) -> Option<String> {
        None
    }
}

/// Parse strictly, falling back to `repair` on failure.
///
/// The returned error is the one from the strict attempt, since it points at
/// the text the caller actually supplied.
pub fn parse_with_repair(input: &str, repair: &dyn JsonRepair) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(input) {
        Ok(v) => Ok(v),
        Err(strict_err) => match repair.repair(input) {
            Some(fixed) => serde_json::from_str::<Value>(&fixed).map_err(|_| strict_err),
            None => Err(strict_err),
        },
    }
}

fn strip_code_fence(text: &str) -> &str {
    if let Some(inner) = CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    // Unterminated fence
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .map(str::trim)
        .unwrap_or(text)
}

/// Slice from the first `{`/`[` to its last matching closer (or to the end when truncated).
fn extract_json_region(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    match text.rfind(closer) {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len() + 8);
    let mut closers: Vec<char> = Vec::new();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out);
            }
            '{' => {
                closers.push('}');
                out.push(c);
                i += 1;
            }
            '[' => {
                closers.push(']');
                out.push(c);
                i += 1;
            }
            '}' | ']' => {
                strip_trailing_comma(&mut out);
                // stray closers are dropped
                if closers.last() == Some(&c) {
                    closers.pop();
                    out.push(c);
                }
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < len && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '$' | '-')) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let mut j = i;
                while j < len && chars[j].is_whitespace() {
                    j += 1;
                }
                let is_key = j < len && chars[j] == ':' && closers.last() == Some(&'}');
                if is_key {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(match word.as_str() {
                        "True" => "true",
                        "False" => "false",
                        "None" | "undefined" => "null",
                        w => w,
                    });
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    while let Some(closer) = closers.pop() {
        strip_trailing_comma(&mut out);
        out.push(closer);
    }
    out
}

/// Copy the string literal starting at `chars[start]` as a double-quoted JSON
/// string. Returns the index after the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let len = chars.len();
    let mut i = start + 1;
    out.push('"');

    while i < len {
        let c = chars[i];
        match c {
            '\\' => {
                if i + 1 >= len {
                    i += 1;
                    continue;
                }
                let next = chars[i + 1];
                if next == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(next);
                }
                i += 2;
            }
            c if c == quote => {
                out.push('"');
                return i + 1;
            }
            '"' => {
                out.push_str("\\\"");
                i += 1;
            }
            '\n' => {
                out.push_str("\\n");
                i += 1;
            }
            '\t' => {
                out.push_str("\\t");
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    // Truncated literal
    out.push('"');
    len
}

fn strip_trailing_comma(out: &mut String) {
    let trimmed = out.trim_end().len();
    if out[..trimmed].ends_with(',') {
        out.truncate(trimmed - 1);
    } else {
        out.truncate(trimmed);
    }
}
