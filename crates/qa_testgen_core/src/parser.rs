//! crates/qa_testgen_core/src/parser.rs
//!
//! Turns the model's free-form reply into `TestCase` records.
//!
//! Parsing happens in two independent steps: [`decode_records`] locates and
//! decodes the JSON payload into raw records, and [`fill_defaults`] turns raw
//! records into complete `TestCase`s. [`parse_with_policy`] combines both and
//! applies the caller's degradation policy when decoding fails.

use crate::domain::{TestCase, DEFAULT_PRIORITY, DEFAULT_STATUS};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("json fence pattern"));
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("fence pattern"));
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern"));

/// A decoded but not yet validated test case object.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response JSON holds no test case records")]
    NoRecords,
    #[error("test case entry {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// What to hand back when the reply cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Substitute a single record that points the user at the raw reply.
    Fallback,
    /// Return nothing, so the caller keeps its previous result set.
    Empty,
}

/// Picks the text most likely to hold the JSON payload.
pub fn extract_candidate(raw: &str) -> &str {
    let fenced = JSON_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .and_then(|caps| caps.get(1));
    let candidate = fenced.map_or(raw, |m| m.as_str()).trim();

    if candidate.starts_with('{') || candidate.starts_with('[') {
        return candidate;
    }
    OBJECT_SPAN
        .find(candidate)
        .map_or(candidate, |m| m.as_str())
}

/// Decodes the reply into raw record objects without filling anything in.
pub fn decode_records(raw: &str) -> Result<Vec<RawRecord>, DecodeError> {
    let candidate = extract_candidate(raw);
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    normalize(value)
}

fn normalize(value: Value) -> Result<Vec<RawRecord>, DecodeError> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            if matches!(object.get("testCases"), Some(Value::Array(_))) {
                take_array(&mut object, "testCases")
            } else if matches!(object.get("testCase"), Some(Value::Array(_))) {
                take_array(&mut object, "testCase")
            } else if looks_like_record(&object) {
                return Ok(vec![object]);
            } else {
                return Err(DecodeError::NoRecords);
            }
        }
        _ => return Err(DecodeError::NoRecords),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(record) => Ok(record),
            _ => Err(DecodeError::NotAnObject { index }),
        })
        .collect()
}

fn take_array(object: &mut RawRecord, key: &str) -> Vec<Value> {
    match object.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn looks_like_record(object: &RawRecord) -> bool {
    ["testCaseId", "description"]
        .iter()
        .any(|key| object.get(*key).and_then(field_text).is_some())
}

/// Renders a JSON field as display text. Falsy values count as missing.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// First present key wins; later keys are accepted synonyms.
fn first_text(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(field_text))
}

/// Completes every raw record with positional and placeholder defaults.
pub fn fill_defaults(records: Vec<RawRecord>) -> Vec<TestCase> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let position = idx + 1;
            TestCase {
                id: first_text(record, &["id"]).unwrap_or_else(|| format!("tc-{}", position)),
                test_case_id: first_text(record, &["testCaseId"])
                    .unwrap_or_else(|| format!("TC{:03}", position)),
                description: first_text(record, &["description"])
                    .unwrap_or_else(|| "Test case description".to_string()),
                steps: first_text(record, &["steps", "step"])
                    .unwrap_or_else(|| "Test steps".to_string()),
                expected_result: first_text(record, &["expectedResult", "expected"])
                    .unwrap_or_else(|| "Expected result".to_string()),
                priority: first_text(record, &["priority"])
                    .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
                status: first_text(record, &["status"])
                    .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            }
        })
        .collect()
}

pub fn parse_test_cases(raw: &str) -> Result<Vec<TestCase>, DecodeError> {
    decode_records(raw).map(fill_defaults)
}

/// The record substituted when generation cannot decode the reply.
pub fn fallback_test_case() -> TestCase {
    TestCase {
        id: "1".to_string(),
        test_case_id: "TC001".to_string(),
        description: "Generated from AI response - parsing failed".to_string(),
        steps: "Review the AI generated response in the chat".to_string(),
        expected_result: "Test cases should be properly formatted".to_string(),
        priority: DEFAULT_PRIORITY.to_string(),
        status: DEFAULT_STATUS.to_string(),
    }
}

/// Never fails; decode errors degrade according to `policy`.
pub fn parse_with_policy(raw: &str, policy: FailurePolicy) -> (Vec<TestCase>, Option<DecodeError>) {
    match parse_test_cases(raw) {
        Ok(test_cases) => (test_cases, None),
        Err(err) => {
            let degraded = match policy {
                FailurePolicy::Fallback => vec![fallback_test_case()],
                FailurePolicy::Empty => Vec::new(),
            };
            (degraded, Some(err))
        }
    }
}
