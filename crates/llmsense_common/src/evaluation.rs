//! Interpretation and evaluation entry points.
//!
//! ## Protocols
//!
//! - **Reflection**: one call scores the interpretation directly
//! - **Chain of thought**: one call analyses step by step, then scores
//! - **Single-round debate**: one call plays Pro, Con and judge
//! - **Iterative debate**: the multi-call state machine in `debate`
//!
//! Every protocol returns a report with something displayable, even when
//! the backend is down or answers in prose.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::DebateConfig;
use crate::debate::{run_iterative_debate, DebateOutcome, DebateSubject};
use crate::interpretation::{parse_output, ParsedOutput, RAW_OUTPUT_KEY};
use crate::llm_client::{Generation, LlmBackend, TextGenerationClient};
use crate::prompts::{
    build_chain_of_thought_prompt, build_interpretation_prompt, build_reflection_prompt,
    build_single_debate_prompt,
};
use crate::regression::FitOutcome;
use crate::store::StoredRecord;
use crate::verdict::{ScoreCard, Verdict, Winner};

/// Evaluation protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMethod {
    Reflection,
    ChainOfThought,
    SingleDebate,
    IterativeDebate,
}

impl EvaluationMethod {
    pub const ALL: [EvaluationMethod; 4] = [
        EvaluationMethod::Reflection,
        EvaluationMethod::ChainOfThought,
        EvaluationMethod::SingleDebate,
        EvaluationMethod::IterativeDebate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reflection => "reflection",
            Self::ChainOfThought => "chain-of-thought",
            Self::SingleDebate => "single-debate",
            Self::IterativeDebate => "iterative-debate",
        }
    }
}

impl std::fmt::Display for EvaluationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for EvaluationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|m| m.label() == normalized)
            .or(match normalized.as_str() {
                "cot" => Some(Self::ChainOfThought),
                "debate" => Some(Self::IterativeDebate),
                _ => None,
            })
            .ok_or_else(|| format!("unknown evaluation method: {}", s))
    }
}

/// Result of asking the backend to interpret an equation
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretOutcome {
    Generated(ParsedOutput),
    /// The window had too few records; no prompt was sent
    InsufficientData,
    BackendUnavailable { message: String },
}

/// Interpret a fitted window. Thin windows never reach the backend.
pub fn interpret<B: LlmBackend>(
    client: &TextGenerationClient<B>,
    fit: &FitOutcome,
) -> InterpretOutcome {
    let Some(equation) = fit.equation() else {
        warn!("Declining to interpret: {}", fit.as_text());
        return InterpretOutcome::InsufficientData;
    };

    match client.generate(&build_interpretation_prompt(equation)) {
        Generation::Text(text) => InterpretOutcome::Generated(parse_output(&text)),
        Generation::Failed { message } => InterpretOutcome::BackendUnavailable { message },
    }
}

/// What an evaluation produced
#[derive(Debug, Clone)]
pub enum EvaluationBody {
    /// A single-call protocol's reply
    Single(ParsedOutput),
    Debate(Box<DebateOutcome>),
    BackendUnavailable { message: String },
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub method: EvaluationMethod,
    pub scores: ScoreCard,
    pub winner: Option<Winner>,
    pub body: EvaluationBody,
}

impl EvaluationReport {
    /// Revised interpretation from an iterative debate, if any
    pub fn revised(&self) -> Option<&ParsedOutput> {
        match &self.body {
            EvaluationBody::Debate(outcome) => outcome.revised(),
            _ => None,
        }
    }

    /// True when the backend could not produce the evaluation's result,
    /// including a debate whose judge call failed
    pub fn is_backend_unavailable(&self) -> bool {
        match &self.body {
            EvaluationBody::BackendUnavailable { .. } => true,
            EvaluationBody::Debate(outcome) => outcome.verdict.is_backend_unavailable(),
            EvaluationBody::Single(_) => false,
        }
    }

    /// JSON view for display and `--json` output
    pub fn to_value(&self) -> Value {
        match &self.body {
            EvaluationBody::Single(output) => output.to_value(RAW_OUTPUT_KEY),
            EvaluationBody::Debate(outcome) => outcome.verdict.to_value(),
            EvaluationBody::BackendUnavailable { message } => {
                serde_json::json!({ "error": message })
            }
        }
    }
}

/// Evaluate a stored record with one protocol
pub fn evaluate<B: LlmBackend>(
    client: &TextGenerationClient<B>,
    record: &StoredRecord,
    method: EvaluationMethod,
    debate: &DebateConfig,
) -> EvaluationReport {
    let equation = record.summary_equation.as_str();
    let reasoning = record.interpretation_text();
    info!("Evaluating with {}", method);

    let prompt = match method {
        EvaluationMethod::Reflection => build_reflection_prompt(equation, &reasoning),
        EvaluationMethod::ChainOfThought => build_chain_of_thought_prompt(equation, &reasoning),
        EvaluationMethod::SingleDebate => build_single_debate_prompt(equation, &reasoning),
        EvaluationMethod::IterativeDebate => {
            let subject = DebateSubject {
                summary_equation: equation,
                interpretation: &reasoning,
            };
            let outcome = run_iterative_debate(client, &subject, debate);
            let (scores, winner) = match &outcome.verdict {
                Verdict::Judged(report) => (report.scores.clone(), report.winner),
                Verdict::Unparsed { .. } | Verdict::BackendUnavailable { .. } => {
                    (ScoreCard::default(), None)
                }
            };
            return EvaluationReport {
                method,
                scores,
                winner,
                body: EvaluationBody::Debate(Box::new(outcome)),
            };
        }
    };

    match client.generate(&prompt) {
        Generation::Text(text) => {
            let output = parse_output(&text);
            let (scores, winner) = match &output {
                ParsedOutput::Parsed(value) => (
                    ScoreCard::from_value(value),
                    value
                        .get("winning_argument")
                        .and_then(|w| w.as_str())
                        .and_then(Winner::from_label),
                ),
                ParsedOutput::Raw(_) => (ScoreCard::default(), None),
            };
            EvaluationReport {
                method,
                scores,
                winner,
                body: EvaluationBody::Single(output),
            }
        }
        Generation::Failed { message } => {
            warn!("{} evaluation failed: {}", method, message);
            EvaluationReport {
                method,
                scores: ScoreCard::default(),
                winner: None,
                body: EvaluationBody::BackendUnavailable { message },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "chain-of-thought".parse::<EvaluationMethod>().unwrap(),
            EvaluationMethod::ChainOfThought
        );
        assert_eq!(
            "Iterative_Debate".parse::<EvaluationMethod>().unwrap(),
            EvaluationMethod::IterativeDebate
        );
        assert_eq!("cot".parse::<EvaluationMethod>().unwrap(), EvaluationMethod::ChainOfThought);
        assert!("vote".parse::<EvaluationMethod>().is_err());
    }

    #[test]
    fn test_method_labels_roundtrip() {
        for method in EvaluationMethod::ALL {
            assert_eq!(method.label().parse::<EvaluationMethod>().unwrap(), method);
        }
    }
}
