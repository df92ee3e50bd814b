//! Evaluation verdicts: scores, winners and the judge's adjudication.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::interpretation::{extract_json, parse_output, ParsedOutput};

/// Scored quality dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Correctness,
    Clarity,
    Usefulness,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Correctness, Metric::Clarity, Metric::Usefulness];

    /// Keys the backend may use for this metric
    fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Correctness => &["correctness_score", "correctness"],
            Self::Clarity => &["clarity_score", "clarity"],
            Self::Usefulness => &[
                "usefulness_score",
                "practical_usefulness_score",
                "usefulness",
            ],
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correctness => write!(f, "correctness"),
            Self::Clarity => write!(f, "clarity"),
            Self::Usefulness => write!(f, "usefulness"),
        }
    }
}

/// Metric scores found in a reply; metrics the backend omitted are absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scores: BTreeMap<Metric, f64>,
}

impl ScoreCard {
    /// Look for scores at the top level, then under `final_scores` or `scores`
    pub fn from_value(value: &Value) -> Self {
        for candidate in [
            Some(value),
            value.get("final_scores"),
            value.get("scores"),
        ]
        .into_iter()
        .flatten()
        {
            let card = Self::from_object(candidate);
            if !card.is_empty() {
                return card;
            }
        }
        Self::default()
    }

    fn from_object(value: &Value) -> Self {
        let mut scores = BTreeMap::new();
        for metric in Metric::ALL {
            if let Some(score) = metric
                .keys()
                .iter()
                .find_map(|key| value.get(*key).and_then(parse_score))
            {
                scores.insert(metric, score);
            }
        }
        Self { scores }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Accept `8`, `8.5`, `"8"` and `"8/10"`
fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok()),
        _ => None,
    }
}

/// Side that won a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Pro,
    Con,
}

impl Winner {
    /// Normalise the labels the prompts offer ("Pro Agent", "Agent A", ...)
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim().to_ascii_lowercase();
        if l.starts_with("pro") || l == "agent a" {
            Some(Self::Pro)
        } else if l.starts_with("con") || l == "agent b" {
            Some(Self::Con)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pro => write!(f, "Pro Agent"),
            Self::Con => write!(f, "Con Agent"),
        }
    }
}

/// Structured judgement of an iterative debate
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeReport {
    pub debate_summary: Option<String>,
    pub winner: Option<Winner>,
    pub reason_for_decision: Option<String>,
    pub scores: ScoreCard,
    /// Revised interpretation proposed by the judge, if any
    pub revised: Option<ParsedOutput>,
    /// The judge's full JSON reply
    pub raw: Value,
}

impl JudgeReport {
    pub fn from_value(value: Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            debate_summary: text("debate_summary"),
            winner: value
                .get("winner")
                .and_then(|v| v.as_str())
                .and_then(Winner::from_label),
            reason_for_decision: text("reason_for_decision"),
            scores: ScoreCard::from_value(&value),
            revised: value.get("revised_pro").and_then(revision_from_value),
            raw: value,
        }
    }
}

/// `revised_pro` arrives as JSON text, an object, or prose
fn revision_from_value(value: &Value) -> Option<ParsedOutput> {
    match value {
        Value::Object(map) if !map.is_empty() => Some(ParsedOutput::Parsed(value.clone())),
        Value::String(s) if !s.trim().is_empty() => Some(parse_output(s)),
        _ => None,
    }
}

/// Message stored alongside the raw text of an unparseable judgement
pub const JUDGE_PARSE_ERROR: &str = "Failed to parse the judge's final JSON output.";

/// Final result of an iterative debate
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Judged(JudgeReport),
    /// Judge reply had no usable JSON object; the text is kept verbatim
    Unparsed { error: String, raw_output: String },
    /// The judge call itself failed after all retries
    BackendUnavailable { message: String },
}

impl Verdict {
    /// Parse the judge's reply; never fails
    pub fn parse(text: &str) -> Self {
        let value = extract_json(text)
            .and_then(|json| serde_json::from_str::<Value>(json).ok())
            .filter(Value::is_object);

        match value {
            Some(value) => Self::Judged(JudgeReport::from_value(value)),
            None => Self::Unparsed {
                error: JUDGE_PARSE_ERROR.to_string(),
                raw_output: text.to_string(),
            },
        }
    }

    pub fn report(&self) -> Option<&JudgeReport> {
        match self {
            Self::Judged(report) => Some(report),
            Self::Unparsed { .. } | Self::BackendUnavailable { .. } => None,
        }
    }

    pub fn revised(&self) -> Option<&ParsedOutput> {
        self.report().and_then(|r| r.revised.as_ref())
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// JSON view: the judge's object, `{error, raw_output}` or `{error}`
    pub fn to_value(&self) -> Value {
        match self {
            Self::Judged(report) => report.raw.clone(),
            Self::Unparsed { error, raw_output } => serde_json::json!({
                "error": error,
                "raw_output": raw_output,
            }),
            Self::BackendUnavailable { message } => serde_json::json!({ "error": message }),
        }
    }
}
