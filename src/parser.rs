//! Turns model text into typed values.
//!
//! Model output is free text even when JSON was requested: it may arrive wrapped
//! in a markdown fence, be truncated, or miss keys. Callers get either the typed
//! value or their own fallback, never a decode error.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Strip an optional ```json ... ``` fence around a payload
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Decode `text` as `T`
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}

/// Decode `text` as `T`, or log and return `fallback()`
pub fn parse_or_else<T, F>(text: &str, context: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match parse_structured::<T>(text) {
        Ok(value) => value,
        Err(e) => {
            let sample: String = text.chars().take(120).collect();
            warn!(
                "JSON parsing error ({}): {} (response started with {:?})",
                context, e, sample
            );
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```JSON\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```Json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_structured_ok() {
        let s: Shape = parse_structured("```json\n{\"name\":\"x\",\"tags\":[\"a\"]}\n```").unwrap();
        assert_eq!(s.name, "x");
        assert_eq!(s.tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_missing_required_key_falls_back() {
        let s = parse_or_else(r#"{"tags":[]}"#, "shape", || Shape {
            name: "fallback".into(),
            tags: vec![],
        });
        assert_eq!(s.name, "fallback");
    }

    #[test]
    fn test_garbage_falls_back() {
        let v: Vec<u32> = parse_or_else("Error generating content", "numbers", Vec::new);
        assert!(v.is_empty());
        let v: Vec<u32> = parse_or_else("{}", "numbers", Vec::new);
        assert!(v.is_empty());
    }
}
