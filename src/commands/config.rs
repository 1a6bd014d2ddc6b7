/// `config` command: set, show, or reset the stored API key.
use std::io::Write;

use crossterm::style::Color;
use tracing::info;

use super::Context;
use crate::cli::args::ConfigArgs;
use crate::cli::output::{write_config_report, write_json};
use crate::cli::{Console, OutputFormat};
use crate::credentials::{ConfigUpdate, mask_api_key};
use crate::types::ConfigReport;
use crate::validation::{CommandError, Outcome};

/// Run `validkit config`.
///
/// `--set-key` takes precedence over `--reset`; with neither, the current
/// configuration is shown.
///
/// # Errors
///
/// Returns `CommandError::Store` when the config file cannot be written or
/// removed.
pub fn run<O: Write, E: Write>(
    args: &ConfigArgs,
    ctx: &Context,
    console: &mut Console<O, E>,
) -> Result<Outcome, CommandError> {
    let palette = console.palette;

    if let Some(key) = args.set_key.as_deref().filter(|k| !k.is_empty()) {
        ctx.store.save(&ConfigUpdate::api_key(key))?;
        info!(path = %ctx.store.path().display(), "api key saved");
        writeln!(console.out, "{}", palette.paint("API key saved successfully", Color::Green))?;
        writeln!(
            console.out,
            "Test it with: {}",
            palette.paint("validkit verify test@example.com", Color::Cyan)
        )?;
        return Ok(Outcome::Done);
    }

    if args.reset {
        ctx.store.reset()?;
        info!(path = %ctx.store.path().display(), "configuration reset");
        writeln!(console.out, "{}", palette.paint("Configuration reset", Color::Green))?;
        return Ok(Outcome::Done);
    }

    let config = ctx.store.load();
    if ctx.settings.format == OutputFormat::Json {
        let report = ConfigReport {
            configured: config.api_key.is_some(),
            api_key: config.api_key.as_deref().map(mask_api_key),
            config_path: config.source.to_string(),
        };
        write_json(&mut console.out, &report)?;
    } else {
        write_config_report(&mut console.out, palette, &config)?;
    }
    Ok(Outcome::Done)
}
