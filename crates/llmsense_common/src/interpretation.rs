//! Best-effort parsing of model output.
//!
//! The backend is asked for strict JSON but nothing enforces it. Every parse
//! here can fail, and failure always leaves a legible raw-text fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding unparsed interpretation text in stored records
pub const RAW_OUTPUT_KEY: &str = "raw_output";

/// Key holding unparsed revised interpretation text in revised records
pub const RAW_REVISED_OUTPUT_KEY: &str = "raw_revised_output";

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*\n?(.*?)```").expect("fenced block pattern is valid")
});

/// Locate the JSON object inside a model reply.
///
/// Accepts bare JSON, fenced code blocks, or the outermost `{...}` span in
/// surrounding prose.
pub fn extract_json(response: &str) -> Option<&str> {
    let t = response.trim();
    if t.starts_with('{') && t.ends_with('}') {
        return Some(t);
    }

    if let Some(inner) = FENCED_BLOCK
        .captures(t)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
    {
        if inner.starts_with('{') && inner.ends_with('}') {
            return Some(inner);
        }
    }

    match (t.find('{'), t.rfind('}')) {
        (Some(s), Some(e)) if s < e => Some(&t[s..=e]),
        _ => None,
    }
}

/// Model output as either a JSON object or the untouched text
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    Parsed(Value),
    Raw(String),
}

impl ParsedOutput {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// JSON form for persistence; raw text is wrapped under `raw_key`
    pub fn to_value(&self, raw_key: &str) -> Value {
        match self {
            Self::Parsed(value) => value.clone(),
            Self::Raw(text) => {
                let mut wrapper = serde_json::Map::new();
                wrapper.insert(raw_key.to_string(), Value::String(text.clone()));
                Value::Object(wrapper)
            }
        }
    }
}

/// Parse a reply, keeping the original text when no JSON object is found
pub fn parse_output(text: &str) -> ParsedOutput {
    extract_json(text)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object)
        .map(ParsedOutput::Parsed)
        .unwrap_or_else(|| ParsedOutput::Raw(text.to_string()))
}

/// The interpretation payload the backend is asked to produce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub maintenance_needed: Option<bool>,
    pub reasoning: Option<String>,
    pub suggestions: Vec<String>,
}

impl Interpretation {
    /// Read the payload leniently. Unknown shapes leave fields empty.
    pub fn from_value(value: &Value) -> Self {
        let maintenance_needed = value.get("maintenance_needed").and_then(parse_flag);
        let reasoning = value
            .get("reasoning")
            .and_then(|r| match r {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.trim().is_empty());
        let suggestions = match value.get("energy_optimization_suggestions") {
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            maintenance_needed,
            reasoning,
            suggestions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.maintenance_needed.is_none() && self.reasoning.is_none() && self.suggestions.is_empty()
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "y" => Some(true),
            "no" | "false" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
