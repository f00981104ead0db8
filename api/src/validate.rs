//! Shape checks for externally sourced JSON payloads.
//!
//! Each validator walks a decoded `serde_json::Value` in a fixed order and
//! reports the first problem it finds. Only after the structure is known to be
//! sound is the value deserialized into its typed form.

use crate::{QuizBashoData, QuizIndex, TorikumiData, TorikumiIndex};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    payload: &'static str,
    reason: String,
}

impl ValidationError {
    fn new(payload: &'static str, reason: impl Into<String>) -> Self {
        Self { payload, reason: reason.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.payload, self.reason)
    }
}

impl std::error::Error for ValidationError {}

const TORIKUMI: &str = "torikumi data";
const INDEX: &str = "torikumi index";
const QUIZ_INDEX: &str = "quiz index";
const QUIZ_DATA: &str = "quiz data";

pub fn validate_torikumi_data(data: &Value) -> ValidationResult<TorikumiData> {
    let fail = |reason: &str| ValidationError::new(TORIKUMI, reason);

    let root = data.as_object().ok_or_else(|| fail("not an object"))?;
    check_basho(root, TORIKUMI)?;

    let day = root.get("day").and_then(Value::as_f64);
    match day {
        Some(d) if (1.0..=15.0).contains(&d) => {
            if d.fract() != 0.0 {
                return Err(fail(&format!("day is not an integer ({})", display_raw(root.get("day")))));
            }
        }
        _ => {
            return Err(fail(&format!("day out of range ({})", display_raw(root.get("day")))));
        }
    }

    let matches = root
        .get("matches")
        .and_then(Value::as_array)
        .ok_or_else(|| fail("matches is not an array"))?;
    for entry in matches {
        let entry = entry.as_object().ok_or_else(|| fail("invalid match entry"))?;
        if !has_string(entry, "east") || !has_string(entry, "west") {
            return Err(fail("match missing east/west"));
        }
    }

    into_typed(data, TORIKUMI)
}

pub fn validate_torikumi_index(data: &Value) -> ValidationResult<TorikumiIndex> {
    let fail = |reason: &str| ValidationError::new(INDEX, reason);

    let root = data.as_object().ok_or_else(|| fail("not an object"))?;

    let basho_list = root
        .get("bashoList")
        .and_then(Value::as_array)
        .ok_or_else(|| fail("bashoList is not an array"))?;
    for entry in basho_list {
        let entry = entry.as_object().ok_or_else(|| fail("invalid bashoList entry"))?;
        if !has_string(entry, "id") || !has_string(entry, "label") {
            return Err(fail("bashoList entry missing id/label"));
        }
        match entry.get("days").and_then(Value::as_f64) {
            Some(days) if days >= 1.0 && days.fract() == 0.0 => {}
            _ => {
                return Err(fail(&format!(
                    "bashoList entry has invalid days ({})",
                    display_raw(entry.get("days"))
                )));
            }
        }
    }

    let latest = root
        .get("latest")
        .and_then(Value::as_object)
        .ok_or_else(|| fail("missing latest"))?;
    if !has_string(latest, "bashoId") || !latest.get("day").is_some_and(Value::is_number) {
        return Err(fail("invalid latest fields"));
    }

    match root.get("status") {
        None => {}
        Some(Value::String(s)) if s == "active" || s == "off-season" => {}
        Some(other) => return Err(fail(&format!("unknown status ({other})"))),
    }

    into_typed(data, INDEX)
}

pub fn validate_quiz_index(data: &Value) -> ValidationResult<QuizIndex> {
    let fail = |reason: &str| ValidationError::new(QUIZ_INDEX, reason);

    let root = data.as_object().ok_or_else(|| fail("not an object"))?;
    let basho_list = root
        .get("bashoList")
        .and_then(Value::as_array)
        .ok_or_else(|| fail("bashoList is not an array"))?;
    for entry in basho_list {
        let entry = entry.as_object().ok_or_else(|| fail("invalid bashoList entry"))?;
        if !has_string(entry, "id") || !has_string(entry, "label") {
            return Err(fail("bashoList entry missing id/label"));
        }
    }

    into_typed(data, QUIZ_INDEX)
}

pub fn validate_quiz_basho_data(data: &Value) -> ValidationResult<QuizBashoData> {
    let fail = |reason: String| ValidationError::new(QUIZ_DATA, reason);

    let root = data.as_object().ok_or_else(|| fail("not an object".into()))?;
    check_basho(root, QUIZ_DATA)?;

    let days = root
        .get("days")
        .and_then(Value::as_object)
        .ok_or_else(|| fail("days is not an object".into()))?;
    for (day, matches) in days {
        let matches = matches
            .as_array()
            .ok_or_else(|| fail(format!("day {day} is not an array")))?;
        for entry in matches {
            let entry = entry
                .as_object()
                .ok_or_else(|| fail(format!("invalid match entry on day {day}")))?;
            if !has_string(entry, "east") || !has_string(entry, "west") {
                return Err(fail(format!("match missing east/west on day {day}")));
            }
            match entry.get("winner").and_then(Value::as_str) {
                Some("E") | Some("W") => {}
                _ => {
                    return Err(fail(format!(
                        "invalid winner ({}) on day {day}",
                        display_raw(entry.get("winner"))
                    )));
                }
            }
            if !has_string(entry, "kimarite") {
                return Err(fail(format!("match missing kimarite on day {day}")));
            }
        }
    }

    into_typed(data, QUIZ_DATA)
}

fn check_basho(root: &Map<String, Value>, payload: &'static str) -> ValidationResult<()> {
    let basho = root
        .get("basho")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new(payload, "missing basho"))?;
    if !has_string(basho, "id") || !has_string(basho, "label") {
        return Err(ValidationError::new(payload, "invalid basho fields"));
    }
    Ok(())
}

fn has_string(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(Value::is_string)
}

/// Render an offending value the way it appeared in the payload.
fn display_raw(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// JSON has one number type, so `3.0` is a valid day. Integral floats are
/// rewritten as integers before serde sees them.
fn normalize_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => Value::from(f as u64),
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < 0.0 => Value::from(f as i64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(normalize_numbers).collect()),
        Value::Object(obj) => {
            Value::Object(obj.iter().map(|(k, v)| (k.clone(), normalize_numbers(v))).collect())
        }
        other => other.clone(),
    }
}

fn into_typed<T: DeserializeOwned>(data: &Value, payload: &'static str) -> ValidationResult<T> {
    T::deserialize(normalize_numbers(data)).map_err(|e| ValidationError::new(payload, e.to_string()))
}
