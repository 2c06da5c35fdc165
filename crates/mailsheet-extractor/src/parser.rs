//! Parse LLM output into project records

use crate::error::ExtractorError;
use mailsheet_domain::{is_placeholder, Field, ProjectRecord};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse a free-text LLM reply into project records
///
/// The reply may wrap the JSON in prose or code fences. The slice from the
/// first `[` to the last `]` is decoded first; if that fails, the slice from
/// the first `{` to the last `}`. A single object becomes a one-element list.
pub fn parse_llm_response(response: &str) -> Result<Vec<ProjectRecord>, ExtractorError> {
    let json = decode_json(response)?;

    let items = match json {
        Value::Array(items) => items,
        Value::Object(obj) => vec![Value::Object(obj)],
        other => {
            return Err(ExtractorError::InvalidFormat(format!(
                "Expected JSON array or object, got {}",
                type_name(&other)
            )))
        }
    };

    let mut records = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(obj) => records.push(parse_record(obj)),
            None => warn!("Item {} is not a JSON object, skipping", idx),
        }
    }

    Ok(records)
}

/// Locate and decode the JSON payload in a reply
fn decode_json(response: &str) -> Result<Value, ExtractorError> {
    let mut last_error = None;

    for (open, close) in [('[', ']'), ('{', '}')] {
        let Some(slice) = delimited(response, open, close) else {
            continue;
        };
        match serde_json::from_str::<Value>(slice) {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!("Candidate {}…{} failed to decode: {}", open, close, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e.into()),
        None => Err(ExtractorError::InvalidFormat(
            "No JSON array or object in response".to_string(),
        )),
    }
}

/// Substring from the first `open` to the last `close`, inclusive
fn delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..end + close.len_utf8()])
}

/// Build a record from one JSON object; unknown keys are ignored
fn parse_record(obj: &Map<String, Value>) -> ProjectRecord {
    let mut record = ProjectRecord::empty();

    for (key, value) in obj {
        let Some(field) = Field::from_key(key) else {
            debug!("Ignoring unknown key '{}'", key);
            continue;
        };
        let text = value_text(value);
        if !is_placeholder(&text) {
            record.set(field, text);
        }
    }

    record
}

/// Render a JSON value as cell text
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => value.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsheet_domain::SENTINEL;

    #[test]
    fn test_parse_array_in_prose() {
        let response = r#"Here is the result: [{"案件名":"X"}] done"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "X");
        assert_eq!(records[0].work_description, SENTINEL);
        assert_eq!(records[0].other_notes, SENTINEL);
    }

    #[test]
    fn test_parse_markdown_fenced_array() {
        let response = "```json\n[\n  {\"案件名\": \"A\", \"勤務場所\": \"東京\"},\n  {\"案件名\": \"B\", \"募集人数\": 2}\n]\n```";
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "東京");
        assert_eq!(records[1].headcount, "2");
    }

    #[test]
    fn test_parse_single_object() {
        let response = r#"{"案件名": "単体案件", "期間": "即日～"}"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, "即日～");
    }

    #[test]
    fn test_bracket_inside_object_string() {
        // The first '[' sits inside a string value, so the array slice is
        // not valid JSON and the object slice is used instead
        let response = r#"結果: {"案件名": "[急募] 基盤構築"}"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records[0].title, "[急募] 基盤構築");
    }

    #[test]
    fn test_unknown_values_become_sentinel() {
        let response = r#"[{"案件名": "X", "募集人数": "不明", "期間": "未記入", "勤務場所": ""}]"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records[0].headcount, SENTINEL);
        assert_eq!(records[0].duration, SENTINEL);
        assert_eq!(records[0].location, SENTINEL);
    }

    #[test]
    fn test_english_keys_and_list_values() {
        let response = r#"[{"title": "Y", "requirements": ["Rust", "AWS"]}]"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records[0].title, "Y");
        assert_eq!(records[0].requirements, "Rust\nAWS");
    }

    #[test]
    fn test_non_object_items_skipped() {
        let response = r#"[{"案件名": "A"}, "stray", 3]"#;
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_no_json() {
        let result = parse_llm_response("申し訳ありませんが抽出できませんでした。");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = parse_llm_response("[{\"案件名\": }]");
        assert!(matches!(result, Err(ExtractorError::JsonParse(_))));
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_llm_response("[]").unwrap().is_empty());
    }
}
