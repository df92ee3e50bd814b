//! Command handlers.
//!
//! Each handler returns the process exit code. Operator mistakes (bad
//! window, bad or unknown record name) are reported and mapped to their
//! exit codes before any backend call or write happens.

use anyhow::{Context, Result};
use tracing::info;

use llmsense_common::config::Config;
use llmsense_common::dataset::SensorTable;
use llmsense_common::evaluation::{self, EvaluationMethod, InterpretOutcome};
use llmsense_common::llm_client::{OllamaBackend, TextGenerationClient};
use llmsense_common::regression::{self, FitOutcome};
use llmsense_common::stats::describe_window;
use llmsense_common::store::{validate_name, ResultStore};
use llmsense_common::TimeWindow;

use crate::cli::WindowArgs;
use crate::errors::{EXIT_GENERAL_ERROR, EXIT_INVALID_INPUT, EXIT_SUCCESS};
use crate::output;

/// Resolved configuration shared by every command
pub struct Session {
    pub config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn store(&self) -> ResultStore {
        ResultStore::new(&self.config.storage.outputs_dir)
    }

    fn load_table(&self) -> Result<SensorTable> {
        let path = &self.config.storage.data_path;
        SensorTable::load_csv(path)
            .with_context(|| format!("Failed to load sensor data from {}", path.display()))
    }

    fn client(&self) -> Result<TextGenerationClient<OllamaBackend>> {
        TextGenerationClient::from_config(&self.config.llm, &self.config.retry)
    }
}

fn resolve_window(args: &WindowArgs) -> Option<TimeWindow> {
    match args.to_window() {
        Ok(window) => Some(window),
        Err(e) => {
            output::display_error(&e.to_string());
            None
        }
    }
}

fn print_summary(table: &SensorTable, window: &TimeWindow) {
    println!("{}", describe_window(table.records(), window).trim_end());

    match regression::fit(table.records(), window) {
        FitOutcome::Equation(equation) => output::display_equation(&equation),
        insufficient => output::display_warning(insufficient.as_text()),
    }
}

/// `summarize`: descriptive statistics plus the regression equation
pub fn summarize(session: &Session, window: &WindowArgs) -> Result<i32> {
    let Some(window) = resolve_window(window) else {
        return Ok(EXIT_INVALID_INPUT);
    };
    let table = session.load_table()?;
    print_summary(&table, &window);
    Ok(EXIT_SUCCESS)
}

/// `summarize --all-days`: one summary per distinct day, in file order
pub fn summarize_all_days(session: &Session) -> Result<i32> {
    let table = session.load_table()?;
    let days = table.days();
    info!("Summarizing {} days", days.len());
    for day in days {
        print_summary(&table, &TimeWindow::day(day));
        println!("{}", output::SEPARATOR);
    }
    Ok(EXIT_SUCCESS)
}

/// `interpret`: fit, ask the backend, optionally persist
pub fn interpret(session: &Session, window: &WindowArgs, save: Option<&str>) -> Result<i32> {
    // Reject a bad name before spending a backend call on it
    let save = save.map(validate_name).transpose()?;
    let Some(window) = resolve_window(window) else {
        return Ok(EXIT_INVALID_INPUT);
    };
    let table = session.load_table()?;

    let fit = regression::fit(table.records(), &window);
    let Some(equation) = fit.equation() else {
        output::display_warning(fit.as_text());
        if save.is_some() {
            output::display_warning("Nothing saved");
        }
        return Ok(EXIT_SUCCESS);
    };
    output::display_equation(equation);

    let client = session.client()?;
    match evaluation::interpret(&client, &fit) {
        InterpretOutcome::Generated(parsed) => {
            output::display_interpretation(&parsed);
            if let Some(name) = save {
                let path = session.store().save_interpretation(&name, equation, &parsed)?;
                output::display_success(&format!("Saved {}", path.display()));
            }
            Ok(EXIT_SUCCESS)
        }
        InterpretOutcome::InsufficientData => {
            output::display_warning(fit.as_text());
            Ok(EXIT_SUCCESS)
        }
        InterpretOutcome::BackendUnavailable { message } => {
            output::display_error(&message);
            Ok(EXIT_GENERAL_ERROR)
        }
    }
}

/// `records`: evaluable record names
pub fn records(session: &Session) -> Result<i32> {
    let store = session.store();
    let names = store.list()?;
    if names.is_empty() {
        output::display_info(&format!("No records in {}", store.dir().display()));
        return Ok(EXIT_SUCCESS);
    }
    for name in names {
        println!("{}", name);
    }
    Ok(EXIT_SUCCESS)
}

/// `show`: print a stored record (or its revision) as JSON
pub fn show(session: &Session, name: &str, revised: bool) -> Result<i32> {
    let store = session.store();
    let value = if revised {
        serde_json::to_value(store.load_revised(name)?)?
    } else {
        serde_json::to_value(store.load(name)?)?
    };
    output::display_json(&value);
    Ok(EXIT_SUCCESS)
}

/// `months`: months present in the dataset
pub fn months(session: &Session) -> Result<i32> {
    let table = session.load_table()?;
    if let Some((first, last)) = table.date_span() {
        output::display_info(&format!(
            "{} records from {} to {}",
            table.len(),
            first,
            last
        ));
    }
    for month in table.months() {
        println!("{}", month);
    }
    Ok(EXIT_SUCCESS)
}

/// `evaluate`: run one protocol and persist any debate revision
pub fn evaluate(
    session: &Session,
    name: &str,
    method: EvaluationMethod,
    rounds: Option<u32>,
    json: bool,
) -> Result<i32> {
    let name = validate_name(name)?;
    let store = session.store();
    let record = store.load(&name)?;

    let mut debate = session.config.debate.clone();
    if let Some(rounds) = rounds {
        debate.rounds = rounds;
    }

    let client = session.client()?;
    info!("Evaluating record {} with {}", name, method);
    let report = evaluation::evaluate(&client, &record, method, &debate);

    if json {
        output::display_json(&output::report_json(&name, &report));
    } else {
        output::display_report(&report);
    }

    if let Some(revision) = report.revised() {
        let path = store.save_revised(&name, &record.summary_equation, revision)?;
        if !json {
            output::display_success(&format!("Saved revision to {}", path.display()));
        }
    }

    if report.is_backend_unavailable() {
        Ok(EXIT_GENERAL_ERROR)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// `config`: print the effective configuration, or write defaults
pub fn config(session: &Session, explicit: Option<&std::path::Path>, init: bool) -> Result<i32> {
    if init {
        let Some(path) = Config::locate(explicit) else {
            output::display_error("No config location available");
            return Ok(EXIT_GENERAL_ERROR);
        };
        if path.exists() {
            output::display_warning(&format!("{} already exists, not overwritten", path.display()));
            return Ok(EXIT_GENERAL_ERROR);
        }
        Config::save_default(&path)?;
        output::display_success(&format!("Wrote {}", path.display()));
        return Ok(EXIT_SUCCESS);
    }

    let text = toml::to_string_pretty(&session.config).context("Failed to render config")?;
    print!("{}", text);
    Ok(EXIT_SUCCESS)
}
