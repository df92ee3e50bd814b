//! LLMSense Control - operator CLI for LLMSense
//!
//! Summarizes sensor windows, asks the local backend to interpret them, and
//! evaluates stored interpretations.

use clap::Parser;

use llmsensectl::cli::{Cli, Commands};
use llmsensectl::commands::{self, Session};
use llmsensectl::errors::exit_code_for;
use llmsensectl::{logging, output};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let session = Session::new(cli.resolve_config());

    let result = match &cli.command {
        Commands::Summarize { all_days: true, .. } => commands::summarize_all_days(&session),
        Commands::Summarize { window, .. } => commands::summarize(&session, window),
        Commands::Interpret { window, save } => {
            commands::interpret(&session, window, save.as_deref())
        }
        Commands::Records => commands::records(&session),
        Commands::Show { name, revised } => commands::show(&session, name, *revised),
        Commands::Months => commands::months(&session),
        Commands::Evaluate {
            name,
            method,
            rounds,
            json,
        } => commands::evaluate(&session, name, *method, *rounds, *json),
        Commands::Config { init } => commands::config(&session, cli.config.as_deref(), *init),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            output::display_error(&format!("{:#}", e));
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
