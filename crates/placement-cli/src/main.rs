//! # placement CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use placement_cli::actions::{run_actions, ActionsArgs};
use placement_cli::transition::{run_transition, TransitionArgs};
use placement_cli::validity::{run_validity, ValidityArgs};

/// Organization lifecycle and agreement validity tooling.
///
/// Reports which organizations may operate, lists the lifecycle actions
/// available to an operator, and runs status transitions against the
/// portal API.
#[derive(Parser, Debug)]
#[command(name = "placement", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report agreement validity for every organization in a document.
    Validity(ValidityArgs),

    /// List the actions available from a status or for an organization.
    Actions(ActionsArgs),

    /// Run one lifecycle transition through the portal API.
    Transition(TransitionArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Validity(args) => run_validity(args),
        Commands::Actions(args) => run_actions(args),
        Commands::Transition(args) => run_transition(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
