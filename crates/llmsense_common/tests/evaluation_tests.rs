//! Evaluation protocols over a scripted backend.

use serde_json::json;

use llmsense_common::config::{DebateConfig, LlmConfig};
use llmsense_common::evaluation::{
    evaluate, interpret, EvaluationBody, EvaluationMethod, InterpretOutcome,
};
use llmsense_common::interpretation::ParsedOutput;
use llmsense_common::llm_client::{no_delay_retry, FakeLlmClient, LlmError, TextGenerationClient};
use llmsense_common::regression::FitOutcome;
use llmsense_common::store::StoredRecord;
use llmsense_common::verdict::{Metric, Winner};

fn client(fake: FakeLlmClient) -> TextGenerationClient<FakeLlmClient> {
    TextGenerationClient::new(fake, &LlmConfig::default(), no_delay_retry(3))
}

fn record() -> StoredRecord {
    StoredRecord::new(
        "Usage_kWh = 2.0000 + 1.0000 * NSM",
        &ParsedOutput::Parsed(json!({"reasoning": "NSM matters"})),
    )
}

#[test]
fn test_reflection_scores() {
    let c = client(FakeLlmClient::always(
        r#"{"correctness_score": 7, "clarity_score": 9, "practical_usefulness_score": 6, "improvement_suggestions": "Mention CO2"}"#,
    ));
    let report = evaluate(&c, &record(), EvaluationMethod::Reflection, &DebateConfig::default());

    assert_eq!(report.scores.get(Metric::Correctness), Some(7.0));
    assert_eq!(report.scores.get(Metric::Usefulness), Some(6.0));
    assert!(report.winner.is_none());
    assert_eq!(c.backend().call_count(), 1);

    let prompt = &c.backend().requests()[0].prompt;
    assert!(prompt.contains("NSM matters"));
    assert_eq!(c.backend().requests()[0].temperature, 0.1);
}

#[test]
fn test_chain_of_thought_nested_scores() {
    let c = client(FakeLlmClient::always(
        r#"```json
{"thought_process": "NSM is the only driver.", "final_scores": {"correctness_score": "8/10", "clarity_score": 7, "usefulness_score": 5}}
```"#,
    ));
    let report = evaluate(&c, &record(), EvaluationMethod::ChainOfThought, &DebateConfig::default());
    assert_eq!(report.scores.get(Metric::Correctness), Some(8.0));
    assert_eq!(report.scores.get(Metric::Usefulness), Some(5.0));
}

#[test]
fn test_single_debate_winner() {
    let c = client(FakeLlmClient::always(
        r#"{"judges_ruling": "B was sharper", "winning_argument": "Agent B", "scores": {"correctness_score": 4, "clarity_score": 6, "practical_usefulness_score": 3}}"#,
    ));
    let report = evaluate(&c, &record(), EvaluationMethod::SingleDebate, &DebateConfig::default());
    assert_eq!(report.winner, Some(Winner::Con));
    assert_eq!(report.scores.get(Metric::Clarity), Some(6.0));
}

#[test]
fn test_prose_reply_is_kept_raw() {
    let c = client(FakeLlmClient::always("It looks fine to me."));
    let report = evaluate(&c, &record(), EvaluationMethod::Reflection, &DebateConfig::default());
    assert!(report.scores.is_empty());
    assert_eq!(report.to_value(), json!({"raw_output": "It looks fine to me."}));
}

#[test]
fn test_backend_unavailable() {
    let c = client(FakeLlmClient::always_error(LlmError::Timeout(120)));
    let report = evaluate(&c, &record(), EvaluationMethod::Reflection, &DebateConfig::default());
    assert!(matches!(report.body, EvaluationBody::BackendUnavailable { .. }));
    assert!(report.is_backend_unavailable());
    let value = report.to_value();
    assert!(value.is_object());
    assert!(value["error"].as_str().unwrap().contains("after 3 attempts"));
}

#[test]
fn test_iterative_debate_with_unavailable_judge() {
    let c = client(FakeLlmClient::new(vec![
        Ok("pro".to_string()),
        Ok("con".to_string()),
        Err(LlmError::Http("refused".to_string())),
    ]));
    let config = DebateConfig {
        rounds: 1,
        ..DebateConfig::default()
    };
    let report = evaluate(&c, &record(), EvaluationMethod::IterativeDebate, &config);

    assert!(matches!(report.body, EvaluationBody::Debate(_)));
    assert!(report.is_backend_unavailable());
    assert!(report.scores.is_empty());
    assert!(report.winner.is_none());
    assert!(report.revised().is_none());
    assert!(report.to_value()["error"].as_str().unwrap().contains("refused"));
}

#[test]
fn test_iterative_debate_returns_revision() {
    let judge = r#"{"winner": "Pro Agent", "final_scores": {"correctness_score": 9}, "revised_pro": {"maintenance_needed": "No", "reasoning": "Refined"}}"#;
    let c = client(FakeLlmClient::new(vec![
        Ok("pro".to_string()),
        Ok("con".to_string()),
        Ok(judge.to_string()),
    ]));
    let config = DebateConfig {
        rounds: 1,
        ..DebateConfig::default()
    };
    let report = evaluate(&c, &record(), EvaluationMethod::IterativeDebate, &config);

    assert_eq!(report.winner, Some(Winner::Pro));
    assert_eq!(report.scores.get(Metric::Correctness), Some(9.0));
    match report.revised() {
        Some(ParsedOutput::Parsed(value)) => assert_eq!(value["reasoning"], "Refined"),
        other => panic!("expected revision, got {:?}", other),
    }
    assert!(!report.is_backend_unavailable());
}

#[test]
fn test_interpret_skips_thin_windows() {
    let c = client(FakeLlmClient::always("{}"));
    let outcome = interpret(&c, &FitOutcome::InsufficientData { records: 1 });
    assert_eq!(outcome, InterpretOutcome::InsufficientData);
    assert_eq!(c.backend().call_count(), 0);
}

#[test]
fn test_interpret_parses_reply() {
    let c = client(FakeLlmClient::always(
        r#"Sure! {"maintenance_needed": "Yes", "reasoning": "High reactive power"}"#,
    ));
    let fit = FitOutcome::Equation("Usage_kWh = 1.0000".to_string());
    match interpret(&c, &fit) {
        InterpretOutcome::Generated(ParsedOutput::Parsed(value)) => {
            assert_eq!(value["maintenance_needed"], "Yes");
        }
        other => panic!("expected parsed interpretation, got {:?}", other),
    }
    assert!(c.backend().requests()[0].prompt.contains("Usage_kWh = 1.0000"));
}
