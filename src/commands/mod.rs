/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod bulk;
pub mod config;
pub mod verify;

use std::io::Write;

use crate::api::{HttpValidationClient, ResponseFormat};
use crate::cli::args::{Command, GlobalArgs};
use crate::cli::{Console, OutputFormat};
use crate::credentials::{ConfigStore, resolve_api_key};
use crate::validation::{CommandError, Outcome};

/// Effective options, merged once from the parsed global arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// `--api-key` override, if given.
    pub api_key: Option<String>,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Settings {
    /// Merge options: an explicit `--format` wins, else `table`.
    ///
    /// clap's global arguments already fold a value given after the
    /// subcommand into the same field, so the latest occurrence wins.
    #[must_use]
    pub fn from_global(global: &GlobalArgs) -> Self {
        Self {
            api_key: global.api_key.clone(),
            format: global.format.unwrap_or_default(),
            quiet: global.quiet,
        }
    }

    /// Wire format to request from the service for this output format.
    #[must_use]
    pub fn response_format(&self) -> ResponseFormat {
        if self.format == OutputFormat::Compact {
            ResponseFormat::Compact
        } else {
            ResponseFormat::Full
        }
    }
}

/// Everything a handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub store: ConfigStore,
}

impl Context {
    /// Resolve the API key or fail with [`CommandError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MissingApiKey` when no key is configured.
    pub fn require_api_key(&self) -> Result<String, CommandError> {
        resolve_api_key(self.settings.api_key.as_deref(), &self.store)
            .ok_or(CommandError::MissingApiKey)
    }
}

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `CommandError` on any command failure.
pub async fn dispatch<O: Write, E: Write>(
    command: &Command,
    ctx: &Context,
    console: &mut Console<O, E>,
) -> Result<Outcome, CommandError> {
    match command {
        Command::Verify(args) => {
            verify::run(args, ctx, |key| HttpValidationClient::from_env(key), console).await
        }
        Command::Bulk(args) => {
            bulk::run(args, ctx, |key| HttpValidationClient::from_env(key), console).await
        }
        Command::Config(args) => config::run(args, ctx, console),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults_to_table() {
        let settings = Settings::from_global(&GlobalArgs::default());
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.response_format(), ResponseFormat::Full);
    }

    #[test]
    fn test_compact_requests_compact_shape() {
        let settings = Settings::from_global(&GlobalArgs {
            format: Some(OutputFormat::Compact),
            ..GlobalArgs::default()
        });
        assert_eq!(settings.response_format(), ResponseFormat::Compact);
    }

    #[test]
    fn test_flag_key_wins_over_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            settings: Settings {
                api_key: Some("flag".to_owned()),
                ..Settings::default()
            },
            store: ConfigStore::new(dir.path().join("config.json"))
                .with_env_key(Some("env".to_owned())),
        };
        assert_eq!(ctx.require_api_key().unwrap(), "flag");
    }

    #[test]
    fn test_missing_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            settings: Settings::default(),
            store: ConfigStore::new(dir.path().join("config.json")),
        };
        assert!(matches!(ctx.require_api_key(), Err(CommandError::MissingApiKey)));
    }
}
