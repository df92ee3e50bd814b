//! Terminal output for llmsensectl.
//!
//! ASCII only. Parsed model output is shown field by field; anything that
//! did not parse is shown verbatim so there is always something to read.

use owo_colors::OwoColorize;
use serde_json::Value;

use llmsense_common::debate::DebateOutcome;
use llmsense_common::evaluation::{EvaluationBody, EvaluationReport};
use llmsense_common::interpretation::{Interpretation, ParsedOutput};
use llmsense_common::verdict::{Metric, ScoreCard, Verdict};

pub const SEPARATOR: &str = "------------------------------------------------------------";

pub fn display_error(message: &str) {
    eprintln!("[ERROR] {}", message.red());
}

pub fn display_warning(message: &str) {
    eprintln!("[WARNING] {}", message.yellow());
}

pub fn display_success(message: &str) {
    println!("[OK] {}", message.green());
}

pub fn display_info(message: &str) {
    println!("[INFO] {}", message);
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// Print a regression equation
pub fn display_equation(equation: &str) {
    section("[EQUATION]");
    println!("  {}", equation.cyan());
}

/// Print an interpretation, parsed or raw
pub fn display_interpretation(output: &ParsedOutput) {
    section("[INTERPRETATION]");
    print_interpretation(output);
}

fn print_interpretation(output: &ParsedOutput) {
    match output {
        ParsedOutput::Parsed(value) => {
            let interpretation = Interpretation::from_value(value);
            if interpretation.is_empty() {
                print_json(value);
                return;
            }
            if let Some(flag) = interpretation.maintenance_needed {
                let label = if flag {
                    "Yes".bright_red().to_string()
                } else {
                    "No".green().to_string()
                };
                println!("  Maintenance needed: {}", label);
            }
            if let Some(reasoning) = &interpretation.reasoning {
                println!("  {}", reasoning);
            }
            if !interpretation.suggestions.is_empty() {
                println!();
                println!("  Suggestions:");
                for suggestion in &interpretation.suggestions {
                    println!("    * {}", suggestion);
                }
            }
        }
        ParsedOutput::Raw(text) => {
            println!("  {}", "(reply was not JSON, shown verbatim)".dimmed());
            println!("{}", text);
        }
    }
}

/// Print a metric table; metrics the backend omitted show as `-`
pub fn display_scores(scores: &ScoreCard) {
    section("[SCORES]");
    if scores.is_empty() {
        println!("  {}", "no scores found in reply".dimmed());
        return;
    }
    for metric in Metric::ALL {
        let value = scores
            .get(metric)
            .map(|s| format!("{:.1}/10", s))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<12} {}", metric.to_string(), value);
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn display_debate(outcome: &DebateOutcome) {
    section("[DEBATE]");
    for turn in outcome.transcript.turns() {
        println!("  Round {} ({}):", turn.round, turn.role.to_string().bold());
        for line in turn.text.lines() {
            println!("    {}", line);
        }
    }

    section("[VERDICT]");
    match &outcome.verdict {
        Verdict::Judged(report) => {
            if let Some(summary) = &report.debate_summary {
                println!("  Summary: {}", summary);
            }
            if let Some(reason) = &report.reason_for_decision {
                println!("  Reason: {}", reason);
            }
            if report.winner.is_none() && report.debate_summary.is_none() {
                print_json(&report.raw);
            }
        }
        Verdict::Unparsed { error, raw_output } => {
            display_warning(error);
            println!("{}", raw_output);
        }
        Verdict::BackendUnavailable { message } => display_error(message),
    }

    if let Some(revised) = outcome.revised() {
        section("[REVISED INTERPRETATION]");
        print_interpretation(revised);
    }
}

/// Print an evaluation report in human-readable form
pub fn display_report(report: &EvaluationReport) {
    println!("{} {}", "Evaluation:".bold(), report.method.to_string().cyan());
    println!("{}", SEPARATOR.dimmed());

    match &report.body {
        EvaluationBody::Single(output) => {
            section("[RESULT]");
            match output {
                ParsedOutput::Parsed(value) => print_json(value),
                ParsedOutput::Raw(text) => {
                    println!("  {}", "(reply was not JSON, shown verbatim)".dimmed());
                    println!("{}", text);
                }
            }
        }
        EvaluationBody::Debate(outcome) => display_debate(outcome),
        EvaluationBody::BackendUnavailable { message } => {
            display_error(message);
            return;
        }
    }

    display_scores(&report.scores);
    if let Some(winner) = report.winner {
        println!();
        println!("  Winner: {}", winner.to_string().bold());
    }
}

/// Serialize a report for `--json`
pub fn report_json(name: &str, report: &EvaluationReport) -> Value {
    let mut out = serde_json::json!({
        "record": name,
        "method": report.method.to_string(),
        "scores": report.scores,
        "winner": report.winner.map(|w| w.to_string()),
        "result": report.to_value(),
    });
    if let EvaluationBody::Debate(outcome) = &report.body {
        out["run_id"] = Value::String(outcome.run_id.to_string());
        out["transcript"] = serde_json::to_value(&outcome.transcript).unwrap_or(Value::Null);
    }
    out
}

/// Pretty-print a JSON value to stdout
pub fn display_json(value: &Value) {
    print_json(value);
}
