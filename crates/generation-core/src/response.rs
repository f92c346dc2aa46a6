//! Cleaning and strict parsing of model responses

use crate::error::GenerationError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

lazy_static! {
    /// Opening fence with optional language tag
    static ref OPENING_FENCE: Regex = Regex::new(r"^```[A-Za-z]*\s*").unwrap();

    static ref CLOSING_FENCE: Regex = Regex::new(r"\s*```$").unwrap();

    /// A comma followed only by whitespace before a closing bracket
    static ref TRAILING_COMMA: Regex = Regex::new(r",(\s*[\]}])").unwrap();
}

/// Trim, strip Markdown code fences and drop trailing commas
pub fn clean_json_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = OPENING_FENCE.replace(trimmed, "");
    let unfenced = CLOSING_FENCE.replace(&unfenced, "");
    TRAILING_COMMA.replace_all(unfenced.trim(), "$1").into_owned()
}

/// Deserialize the response as a JSON array of `T`
///
/// Valid JSON is parsed as-is. Fence stripping and comma repair only run
/// when the strict parse fails, so string values are never rewritten.
pub fn parse_json_array<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, GenerationError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(values) = serde_json::from_str::<Vec<T>>(trimmed) {
            return Ok(values);
        }
    }

    let cleaned = clean_json_response(raw);
    if !cleaned.starts_with('[') {
        return Err(GenerationError::Parse(format!(
            "expected a JSON array, got: {}",
            preview(&cleaned)
        )));
    }
    serde_json::from_str(&cleaned).map_err(|e| GenerationError::Parse(e.to_string()))
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
