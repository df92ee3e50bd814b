//! Iterative multi-round debate.
//!
//! Flow:
//! 1. `ProTurn(i)`: defend the interpretation, given the transcript so far
//! 2. `ConTurn(i)`: critique it, given the transcript including Pro's turn
//! 3. repeat for `rounds` rounds
//! 4. `Judging`: one low-temperature call adjudicates the whole transcript
//! 5. `Done`: the judge's reply is parsed into a `Verdict`
//!
//! Transport failures never abort a run: an agent's failure payload is
//! appended as that turn's utterance, and a failed judge call yields
//! `Verdict::BackendUnavailable`. Transitions and prompt construction are pure; only
//! `run_iterative_debate` talks to the backend.

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::DebateConfig;
use crate::interpretation::ParsedOutput;
use crate::llm_client::{Generation, LlmBackend, TextGenerationClient};
use crate::prompts::{build_debate_agent_prompt, build_judge_prompt};
use crate::transcript::{DebateTranscript, Role};
use crate::verdict::Verdict;

/// Default number of Pro/Con rounds
pub const DEFAULT_ROUNDS: u32 = 2;

/// Debate state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebateState {
    ProTurn(u32),
    ConTurn(u32),
    Judging,
    Done,
}

impl DebateState {
    /// Starting state; zero rounds go straight to the judge
    pub fn initial(rounds: u32) -> Self {
        if rounds == 0 {
            Self::Judging
        } else {
            Self::ProTurn(1)
        }
    }

    pub fn next(self, rounds: u32) -> Self {
        match self {
            Self::ProTurn(i) => Self::ConTurn(i),
            Self::ConTurn(i) if i < rounds => Self::ProTurn(i + 1),
            Self::ConTurn(_) => Self::Judging,
            Self::Judging | Self::Done => Self::Done,
        }
    }

    /// Round and speaker for agent turns
    pub fn speaker(&self) -> Option<(u32, Role)> {
        match self {
            Self::ProTurn(i) => Some((*i, Role::Pro)),
            Self::ConTurn(i) => Some((*i, Role::Con)),
            Self::Judging | Self::Done => None,
        }
    }
}

impl std::fmt::Display for DebateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProTurn(i) => write!(f, "pro-turn({})", i),
            Self::ConTurn(i) => write!(f, "con-turn({})", i),
            Self::Judging => write!(f, "judging"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// The material under debate
#[derive(Debug, Clone, Copy)]
pub struct DebateSubject<'a> {
    pub summary_equation: &'a str,
    /// The original interpretation, as sent to the agents
    pub interpretation: &'a str,
}

/// Prompt and temperature for the call a state makes
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub prompt: String,
    pub temperature: f64,
}

/// Build the request for `state`. `Done` makes no call.
pub fn request_for(
    state: DebateState,
    subject: &DebateSubject<'_>,
    transcript: &DebateTranscript,
    agent_temperature: f64,
    judge_temperature: f64,
) -> Option<TurnRequest> {
    match state {
        DebateState::ProTurn(_) | DebateState::ConTurn(_) => {
            let (_, role) = state.speaker()?;
            Some(TurnRequest {
                prompt: build_debate_agent_prompt(
                    subject.summary_equation,
                    subject.interpretation,
                    role,
                    transcript,
                ),
                temperature: agent_temperature,
            })
        }
        DebateState::Judging => Some(TurnRequest {
            prompt: build_judge_prompt(subject.summary_equation, subject.interpretation, transcript),
            temperature: judge_temperature,
        }),
        DebateState::Done => None,
    }
}

/// Everything a finished debate produced
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub run_id: Uuid,
    pub transcript: DebateTranscript,
    /// The judge's reply, verbatim; empty when the judge call failed
    pub judge_output: String,
    pub verdict: Verdict,
}

impl DebateOutcome {
    /// Revised interpretation for the caller to persist, if the judge gave one
    pub fn revised(&self) -> Option<&ParsedOutput> {
        self.verdict.revised()
    }
}

/// Run a full debate. Blocks for `2 * rounds + 1` backend round-trips.
pub fn run_iterative_debate<B: LlmBackend>(
    client: &TextGenerationClient<B>,
    subject: &DebateSubject<'_>,
    config: &DebateConfig,
) -> DebateOutcome {
    let run_id = Uuid::new_v4();
    let span = info_span!("debate", run_id = %run_id, rounds = config.rounds);
    let _guard = span.enter();

    info!("Starting iterative debate");

    let judge_temperature = client.default_temperature();
    let mut state = DebateState::initial(config.rounds);
    let mut transcript = DebateTranscript::new();
    let mut judge_output = String::new();
    let mut judge_failure = None;

    while state != DebateState::Done {
        let Some(request) = request_for(
            state,
            subject,
            &transcript,
            config.agent_temperature,
            judge_temperature,
        ) else {
            break;
        };

        debug!("{}: prompt is {} bytes", state, request.prompt.len());
        let generation = client.generate_at(&request.prompt, request.temperature);
        if generation.is_failed() {
            warn!("{}: backend unavailable, recording failure in transcript", state);
        }

        match state.speaker() {
            Some((round, role)) => {
                transcript = transcript.with_turn(round, role, generation.into_utterance());
            }
            None => match generation {
                Generation::Text(text) => judge_output = text,
                Generation::Failed { message } => judge_failure = Some(message),
            },
        }

        state = state.next(config.rounds);
    }

    let verdict = match judge_failure {
        Some(message) => Verdict::BackendUnavailable { message },
        None => Verdict::parse(&judge_output),
    };
    match &verdict {
        Verdict::Judged(report) => info!(
            "Debate judged: winner={}, revision={}",
            report
                .winner
                .map(|w| w.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            report.revised.is_some()
        ),
        Verdict::Unparsed { .. } => warn!("Judge output was not valid JSON, keeping raw text"),
        Verdict::BackendUnavailable { message } => warn!("Judge unavailable: {}", message),
    }

    DebateOutcome {
        run_id,
        transcript,
        judge_output,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_sequence_two_rounds() {
        let mut state = DebateState::initial(2);
        let mut seen = vec![state];
        while state != DebateState::Done {
            state = state.next(2);
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                DebateState::ProTurn(1),
                DebateState::ConTurn(1),
                DebateState::ProTurn(2),
                DebateState::ConTurn(2),
                DebateState::Judging,
                DebateState::Done,
            ]
        );
    }

    #[test]
    fn test_zero_rounds_goes_to_judging() {
        assert_eq!(DebateState::initial(0), DebateState::Judging);
    }

    #[test]
    fn test_request_temperatures() {
        let subject = DebateSubject {
            summary_equation: "Usage_kWh = 1.0000",
            interpretation: "fine",
        };
        let t = DebateTranscript::new();
        let pro = request_for(DebateState::ProTurn(1), &subject, &t, 0.5, 0.1).unwrap();
        let judge = request_for(DebateState::Judging, &subject, &t, 0.5, 0.1).unwrap();
        assert_eq!(pro.temperature, 0.5);
        assert!(pro.prompt.contains("DEFEND"));
        assert_eq!(judge.temperature, 0.1);
        assert!(request_for(DebateState::Done, &subject, &t, 0.5, 0.1).is_none());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(DebateState::ConTurn(2).to_string(), "con-turn(2)");
    }
}
