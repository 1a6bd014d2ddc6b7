#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! validkit: verify email addresses from the command line.

mod api;
mod cli;
mod commands;
mod credentials;
mod logging;
mod types;
mod validation;

use std::process::ExitCode;

use clap::Parser;
use clap::error::{ContextKind, ContextValue, ErrorKind};

use cli::{Cli, Console, write_error};
use commands::{Context, Settings};
use credentials::ConfigStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_error(&err),
    };

    // Project-local `.env` values fill in variables that are not already set.
    dotenvy::dotenv().ok();
    logging::init_tracing(cli.global.verbose);

    let settings = Settings::from_global(&cli.global);
    let format = settings.format;
    let ctx = Context {
        store: ConfigStore::from_env(),
        settings,
    };
    let mut console = Console::stdio();

    match commands::dispatch(&cli.command, &ctx, &mut console).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::debug!(code = err.code(), "command failed");
            let palette = console.palette;
            write_error(&mut console.err, palette, &err, format);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Report a parse failure. Help and version requests exit `0`.
fn usage_error(err: &clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            let name = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.as_str(),
                _ => "",
            };
            eprintln!("Unknown command: {name}");
            eprintln!("Run validkit --help for usage information");
            ExitCode::FAILURE
        }
        _ => {
            let _ = err.print();
            ExitCode::FAILURE
        }
    }
}
