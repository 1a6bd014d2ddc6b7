/// Errors surfaced by command handlers.
use std::path::PathBuf;

use thiserror::Error;

use crate::api::ClientError;
use crate::credentials::StoreError;

/// Hint printed whenever no API key can be resolved.
pub const SET_KEY_HINT: &str = "Set your API key with: validkit config --set-key YOUR_KEY";

/// Hint pointing to where keys are issued.
pub const SIGNUP_HINT: &str = "Or get one at: https://validkit.com";

/// Errors that terminate a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No API key from flag, environment, or config file.
    #[error("No API key found")]
    MissingApiKey,

    /// The bulk input file could not be read.
    #[error("{}", path.display())]
    ReadInput {
        /// The file that failed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bulk input file held no addresses.
    #[error("No emails found in file")]
    EmptyInput {
        /// The file that was empty.
        path: PathBuf,
    },

    /// The config file could not be written or removed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The service answered with a structured error payload.
    #[error("{message}")]
    Api {
        /// HTTP status code received.
        status: u16,
        /// Message embedded in the payload.
        message: String,
    },

    /// Any other failure talking to the service.
    #[error("{0}")]
    Transport(String),

    /// Results could not be written to the requested file.
    #[error("Failed to write results to {}: {source}", path.display())]
    WriteOutput {
        /// Destination file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the terminal failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClientError> for CommandError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, message } => Self::Api { status, message },
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Exit code mapping for `CommandError` variants.
impl CommandError {
    /// Return the CLI exit code for this error.
    ///
    /// `1` for user-correctable problems, `2` for service failures.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingApiKey
            | Self::ReadInput { .. }
            | Self::EmptyInput { .. }
            | Self::Store(_) => 1,
            Self::Api { .. } | Self::Transport(_) | Self::WriteOutput { .. } | Self::Io(_) => 2,
        }
    }

    /// Machine-readable error code for the JSON envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "missing_api_key",
            Self::ReadInput { .. } => "read_input",
            Self::EmptyInput { .. } => "empty_input",
            Self::Store(_) => "config_store",
            Self::Api { .. } => "api_error",
            Self::Transport(_) => "transport_error",
            Self::WriteOutput { .. } => "write_output",
            Self::Io(_) => "io",
        }
    }

    /// Prefix for the text-mode diagnostic line.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadInput { .. } => "Error reading file",
            Self::Api { .. } => "API Error",
            _ => "Error",
        }
    }

    /// Remediation lines shown after the message.
    #[must_use]
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::MissingApiKey => vec![SET_KEY_HINT.to_owned(), SIGNUP_HINT.to_owned()],
            _ => Vec::new(),
        }
    }
}
