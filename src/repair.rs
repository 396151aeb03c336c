//! Structural repair and schema validation for LLM-produced JSON.
//!
//! The expansion collaborator promises best-effort structured text, not
//! valid JSON. [`repair`] applies a fixed sequence of structural fixes,
//! re-checking parseability after each step, and fails with
//! `MalformedBeyondRepair` once the sequence is exhausted.
//! [`validate_material`] then independently checks the repaired text
//! against the output schema; shape mismatches are reported as
//! `SchemaMismatch`, never silently coerced.

use crate::error::{Result, TocForgeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One expanded section of the final material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMaterial {
    pub title: String,
    pub description: String,
}

/// The persisted artifact: section number ("chapter1", ...) to material.
pub type TocMaterial = BTreeMap<String, SectionMaterial>;

/// Repair `raw` into parseable JSON text.
///
/// Steps, each followed by a parse re-check:
/// (a) trim to the outermost balanced brace/bracket span,
/// (b) strip trailing commas before closing delimiters,
/// (c) escape raw control characters inside string literals,
/// (d) re-balance unmatched delimiters.
///
/// Already-valid input passes through unchanged apart from whitespace
/// trimming, which makes `repair` idempotent.
pub fn repair(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if parses(trimmed) {
        return Ok(trimmed.to_string());
    }

    let mut candidate = outer_span(trimmed).unwrap_or_else(|| trimmed.to_string());
    if parses(&candidate) {
        return Ok(candidate);
    }

    candidate = strip_trailing_commas(&candidate);
    if parses(&candidate) {
        return Ok(candidate);
    }

    candidate = escape_control_chars(&candidate);
    if parses(&candidate) {
        return Ok(candidate);
    }

    // Re-balancing can surface a comma as newly trailing, so strip again.
    candidate = strip_trailing_commas(&rebalance(&candidate));
    if parses(&candidate) {
        return Ok(candidate);
    }

    let preview: String = raw.chars().take(120).collect();
    Err(TocForgeError::MalformedBeyondRepair(preview))
}

/// Check repaired JSON text against the output schema.
///
/// The artifact must be a non-empty object whose keys are "chapter<N>"
/// section numbers and whose values carry a non-empty string title and a
/// string description.
pub fn validate_material(json: &str) -> Result<TocMaterial> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| TocForgeError::MalformedBeyondRepair(e.to_string()))?;

    let Value::Object(map) = &value else {
        return Err(TocForgeError::SchemaMismatch(
            "top level must be a JSON object".to_string(),
        ));
    };
    if map.is_empty() {
        return Err(TocForgeError::SchemaMismatch(
            "top-level object has no sections".to_string(),
        ));
    }

    for (key, section) in map {
        if !is_section_number(key) {
            return Err(TocForgeError::SchemaMismatch(format!(
                "'{key}' is not a section number of the form 'chapter<N>'"
            )));
        }
        let Value::Object(fields) = section else {
            return Err(TocForgeError::SchemaMismatch(format!(
                "section '{key}' must be an object"
            )));
        };
        match fields.get("title") {
            Some(Value::String(title)) if !title.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(TocForgeError::SchemaMismatch(format!(
                    "section '{key}' has an empty title"
                )));
            }
            _ => {
                return Err(TocForgeError::SchemaMismatch(format!(
                    "section '{key}' is missing a string 'title'"
                )));
            }
        }
        if !matches!(fields.get("description"), Some(Value::String(_))) {
            return Err(TocForgeError::SchemaMismatch(format!(
                "section '{key}' is missing a string 'description'"
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| TocForgeError::SchemaMismatch(e.to_string()))
}

fn is_section_number(key: &str) -> bool {
    key.strip_prefix("chapter")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn parses(s: &str) -> bool {
    serde_json::from_str::<Value>(s).is_ok()
}

/// Trim to the outermost balanced brace/bracket span, string-aware.
///
/// Returns the span from the first opener to its matching closer, or the
/// tail starting at the first opener when the span never closes (later
/// steps re-balance it).
fn outer_span(s: &str) -> Option<String> {
    let start = s.find(['{', '['])?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
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
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    Some(s[start..].to_string())
}

/// Remove commas whose next non-whitespace character closes an object/array.
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
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
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Escape raw control characters inside string literals.
fn escape_control_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out
}

/// Drop orphan closing delimiters and append the closers still owed.
fn rebalance(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if in_string {
            out.push(c);
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
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                stack.push('}');
                out.push(c);
            }
            '[' => {
                stack.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    if in_string {
        out.push('"');
    }
    while let Some(c) = stack.pop() {
        out.push(c);
    }

    out
}
