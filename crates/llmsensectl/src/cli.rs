//! Command-line surface

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use llmsense_common::evaluation::EvaluationMethod;
use llmsense_common::{Config, SenseError, TimeWindow};

#[derive(Parser, Debug)]
#[command(name = "llmsensectl")]
#[command(about = "LLMSense - regression summaries of plant energy data, interpreted and evaluated by a local LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $LLMSENSE_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sensor CSV to load
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Directory for stored records
    #[arg(long, global = true)]
    pub outputs: Option<PathBuf>,

    /// Generation model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Generation backend base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe a window and print its regression equation
    Summarize {
        #[command(flatten)]
        window: WindowArgs,

        /// Summarize every day in the dataset instead of one window
        #[arg(long, conflicts_with_all = ["day", "from", "to", "month"])]
        all_days: bool,
    },

    /// Ask the backend to interpret a window's equation
    Interpret {
        #[command(flatten)]
        window: WindowArgs,

        /// Store the interpretation under this record name
        #[arg(long)]
        save: Option<String>,
    },

    /// List stored records that can be evaluated
    Records,

    /// Print a stored record
    Show {
        name: String,

        /// Show the debate-revised version instead
        #[arg(long)]
        revised: bool,
    },

    /// List the months present in the dataset
    Months,

    /// Evaluate a stored interpretation
    Evaluate {
        name: String,

        /// reflection, chain-of-thought, single-debate or iterative-debate
        #[arg(long, short)]
        method: EvaluationMethod,

        /// Pro/Con rounds for the iterative debate
        #[arg(long)]
        rounds: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file to the lookup location
        #[arg(long)]
        init: bool,
    },
}

/// Time window selection: `--day`, `--from`/`--to`, or `--month`
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Single day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to", "month"])]
    pub day: Option<NaiveDate>,

    /// First day of an inclusive range (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of an inclusive range (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Calendar month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,
}

impl WindowArgs {
    pub fn to_window(&self) -> Result<TimeWindow, SenseError> {
        match (self.day, self.from, self.to, self.month.as_deref()) {
            (Some(day), None, None, None) => Ok(TimeWindow::day(day)),
            (None, Some(start), Some(end), None) => TimeWindow::range(start, end),
            (None, None, None, Some(month)) => TimeWindow::parse_month(month),
            _ => Err(SenseError::Dataset(
                "choose a window with --day, --from/--to or --month".to_string(),
            )),
        }
    }
}

impl Cli {
    /// Load config and apply command-line overrides
    pub fn resolve_config(&self) -> Config {
        let mut config = Config::load(self.config.as_deref());
        if let Some(data) = &self.data {
            config.storage.data_path = data.clone();
        }
        if let Some(outputs) = &self.outputs {
            config.storage.outputs_dir = outputs.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = endpoint.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("llmsensectl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_day_window() {
        let cli = parse(&["summarize", "--day", "2018-01-01"]);
        let Commands::Summarize { window, all_days } = cli.command else {
            panic!("wrong command");
        };
        assert!(!all_days);
        assert_eq!(window.to_window().unwrap().to_string(), "2018-01-01");
    }

    #[test]
    fn test_all_days_flag() {
        let cli = parse(&["summarize", "--all-days"]);
        let Commands::Summarize { all_days, .. } = cli.command else {
            panic!("wrong command");
        };
        assert!(all_days);

        let args = ["llmsensectl", "summarize", "--all-days", "--day", "2018-01-01"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_range_requires_both_ends() {
        let args = ["llmsensectl", "summarize", "--from", "2018-01-01"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_day_conflicts_with_month() {
        let args = ["llmsensectl", "summarize", "--day", "2018-01-01", "--month", "2018-01"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_missing_window_is_error() {
        assert!(WindowArgs::default().to_window().is_err());
    }

    #[test]
    fn test_evaluate_args() {
        let cli = parse(&["evaluate", "jan", "--method", "iterative-debate", "--rounds", "3"]);
        match cli.command {
            Commands::Evaluate {
                name,
                method,
                rounds,
                json,
            } => {
                assert_eq!(name, "jan");
                assert_eq!(method, EvaluationMethod::IterativeDebate);
                assert_eq!(rounds, Some(3));
                assert!(!json);
            }
            other => panic!("wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let cli = parse(&[
            "--config",
            "/nonexistent/llmsense.toml",
            "--model",
            "llama3",
            "--outputs",
            "/tmp/out",
            "records",
        ]);
        let config = cli.resolve_config();
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.storage.outputs_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.llm.temperature, 0.1);
    }
}
