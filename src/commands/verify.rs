/// `verify` command: validate a single email address.
use std::io::Write;

use tracing::debug;

use super::Context;
use crate::api::{ClientError, ValidationClient, VerifyOptions};
use crate::cli::Console;
use crate::cli::args::VerifyArgs;
use crate::cli::output::write_email_result;
use crate::validation::{CommandError, Outcome};

/// Run `validkit verify`.
///
/// Exits `0` for a valid address and `1` for an invalid one; both are
/// successful outcomes.
///
/// # Errors
///
/// Returns `CommandError::MissingApiKey` when no key is configured, and
/// `CommandError::Api`/`Transport` when the service call fails.
pub async fn run<C, F, O, E>(
    args: &VerifyArgs,
    ctx: &Context,
    connect: F,
    console: &mut Console<O, E>,
) -> Result<Outcome, CommandError>
where
    C: ValidationClient,
    F: FnOnce(String) -> Result<C, ClientError>,
    O: Write,
    E: Write,
{
    let settings = &ctx.settings;
    console.set_quiet(settings.quiet);
    let api_key = ctx.require_api_key()?;

    console.start("Validating email...");

    let opts = VerifyOptions {
        format: settings.response_format(),
        debug: args.debug,
        trace_id: args.trace_id.clone(),
    };
    debug!(format = ?opts.format, debug = opts.debug, "verifying address");

    let result = match connect(api_key) {
        Ok(client) => client.verify_email(&args.email, &opts).await,
        Err(e) => Err(e),
    };
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            console.fail("Validation failed");
            return Err(e.into());
        }
    };

    console.succeed("Email validated");
    let palette = console.palette;
    write_email_result(&mut console.out, palette, &result, settings.format, settings.quiet)?;

    Ok(Outcome::from_validity(result.is_valid()))
}
