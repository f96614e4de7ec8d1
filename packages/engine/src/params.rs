//! Parameter-bag normalization and per-item resolution.
//!
//! Incoming parameters are fuzzy: each entry is independently a scalar, an
//! array, or a JSON-encoded string holding an array (an accommodation for
//! callers that cannot send native arrays). Normalization happens exactly
//! once, up front; everything downstream sees either a scalar entry or an
//! array entry, and per-item resolution reduces both to the fully
//! scalarized [`ItemParams`] record a handler works with.
//!
//! A string that fails to parse as JSON, or parses to something other than
//! an array, stays a plain scalar string. That silent fallback is
//! deliberate; callers rely on it.

use crate::error::EngineError;
use easel_scene::{Color, Detail};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One normalized parameter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEntry {
    Scalar(Value),
    List(Vec<Value>),
}

/// Normalized view of a request's flat parameter bag.
#[derive(Debug, Clone, Default)]
pub struct ParamBag {
    entries: BTreeMap<String, ParamEntry>,
}

impl ParamBag {
    pub fn new(raw: &Map<String, Value>) -> Self {
        let entries = raw
            .iter()
            .map(|(key, value)| (key.clone(), normalize(value)))
            .collect();
        Self { entries }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_array(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(ParamEntry::List(_)))
    }

    /// Iteration count: length of the longest array entry, 1 if none.
    pub fn fan_out_len(&self) -> usize {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                ParamEntry::List(values) => Some(values.len()),
                ParamEntry::Scalar(_) => None,
            })
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Every value of an entry, without cycling: a scalar contributes a
    /// single element. Query parameters (start ids, type filters) are
    /// read this way because they address the whole request, not one
    /// bulk item.
    pub fn all_strings(&self, key: &str) -> Vec<String> {
        match self.entries.get(key) {
            Some(ParamEntry::Scalar(Value::String(text))) => vec![text.clone()],
            Some(ParamEntry::List(values)) => values
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fully scalarized parameter set for item `index`. Array entries
    /// cycle: element `index % len` is used, so arrays shorter than the
    /// fan-out count wrap around.
    pub fn item(&self, index: usize) -> ItemParams {
        let values = self
            .entries
            .iter()
            .filter_map(|(key, entry)| {
                let value = match entry {
                    ParamEntry::Scalar(value) => value.clone(),
                    ParamEntry::List(values) => {
                        if values.is_empty() {
                            return None;
                        }
                        values[index % values.len()].clone()
                    }
                };
                Some((key.clone(), value))
            })
            .collect();
        ItemParams { index, values }
    }
}

fn normalize(value: &Value) -> ParamEntry {
    match value {
        Value::Array(items) => ParamEntry::List(items.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => ParamEntry::List(items),
            // Anything else (parse failure included) stays a scalar string.
            _ => ParamEntry::Scalar(value.clone()),
        },
        other => ParamEntry::Scalar(other.clone()),
    }
}

/// Scalarized parameters for one bulk item. Owned exclusively by one
/// fan-out execution; never persisted.
#[derive(Debug, Clone)]
pub struct ItemParams {
    index: usize,
    values: BTreeMap<String, Value>,
}

impl ItemParams {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, EngineError> {
        self.str(key).ok_or_else(|| EngineError::missing_param(key))
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn u32(&self, key: &str) -> Option<u32> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn usize(&self, key: &str) -> Option<usize> {
        match self.values.get(key)? {
            Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Hex color parameter. Present-but-unparseable is an item-level
    /// error; the batch continues.
    pub fn color(&self, key: &str) -> Result<Option<Color>, EngineError> {
        let Some(text) = self.str(key) else {
            return Ok(None);
        };
        Color::from_hex(&text)
            .map(Some)
            .ok_or_else(|| EngineError::Validation(format!("Invalid color for {key}: {text:?}")))
    }

    /// Detail level parameter, falling back to the configured default.
    pub fn detail(&self, default: Detail) -> Result<Detail, EngineError> {
        match self.str("detail") {
            Some(text) => Detail::parse(&text).ok_or_else(|| {
                EngineError::Validation(format!(
                    "Invalid detail level: {text:?}. Valid levels: minimal, standard, detailed"
                ))
            }),
            None => Ok(default),
        }
    }

    /// String-list parameter: a scalar contributes one entry.
    pub fn str_list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(Value::String(text)) => vec![text.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> ParamBag {
        ParamBag::new(value.as_object().unwrap())
    }

    #[test]
    fn test_scalar_only_bag_is_single_item() {
        let bag = bag(json!({ "name": "R1", "width": 100 }));
        assert_eq!(bag.fan_out_len(), 1);
        let item = bag.item(0);
        assert_eq!(item.str("name").unwrap(), "R1");
        assert_eq!(item.f64("width").unwrap(), 100.0);
    }

    #[test]
    fn test_fan_out_len_is_longest_array() {
        let bag = bag(json!({
            "nodeId": ["a", "b", "c"],
            "width": [100, 200],
            "fillColor": "#FF0000"
        }));
        assert_eq!(bag.fan_out_len(), 3);
    }

    #[test]
    fn test_short_arrays_cycle() {
        let bag = bag(json!({
            "nodeId": ["a", "b", "c"],
            "width": [100, 200]
        }));
        let widths: Vec<f64> = (0..3).map(|i| bag.item(i).f64("width").unwrap()).collect();
        assert_eq!(widths, [100.0, 200.0, 100.0]);
    }

    #[test]
    fn test_scalars_repeat_for_every_item() {
        let bag = bag(json!({ "nodeId": ["a", "b"], "fillColor": "#FF0000" }));
        for i in 0..2 {
            assert_eq!(bag.item(i).str("fillColor").unwrap(), "#FF0000");
        }
    }

    #[test]
    fn test_json_string_array_is_unwrapped() {
        let bag = bag(json!({ "nodeId": "[\"a\", \"b\"]" }));
        assert!(bag.is_array("nodeId"));
        assert_eq!(bag.fan_out_len(), 2);
        assert_eq!(bag.item(1).str("nodeId").unwrap(), "b");
    }

    #[test]
    fn test_malformed_json_string_stays_scalar() {
        let bag = bag(json!({ "name": "[not json", "nodeId": "a" }));
        assert!(!bag.is_array("name"));
        assert_eq!(bag.fan_out_len(), 1);
        assert_eq!(bag.item(0).str("name").unwrap(), "[not json");
    }

    #[test]
    fn test_json_string_non_array_stays_scalar_string() {
        let bag = bag(json!({ "name": "42" }));
        assert!(!bag.is_array("name"));
        assert_eq!(bag.item(0).str("name").unwrap(), "42");
    }

    #[test]
    fn test_empty_array_entry_is_absent_from_items() {
        let bag = bag(json!({ "nodeId": ["a"], "width": [] }));
        assert_eq!(bag.fan_out_len(), 1);
        assert!(bag.item(0).get("width").is_none());
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let bag = bag(json!({ "x": "100", "visible": "true" }));
        let item = bag.item(0);
        assert_eq!(item.f64("x").unwrap(), 100.0);
        assert_eq!(item.bool("visible").unwrap(), true);
    }

    #[test]
    fn test_invalid_color_is_an_error_missing_is_not() {
        let bag = bag(json!({ "fillColor": "chartreuse" }));
        assert!(bag.item(0).color("fillColor").is_err());
        assert!(bag.item(0).color("strokeColor").unwrap().is_none());
    }
}
