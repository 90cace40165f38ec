//! Errors returned by command dispatch.

use std::io;

use thiserror::Error;

use crate::options::OptionError;

/// Errors that can occur while resolving and running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The named command is neither registered nor a visible reserved command.
    #[error("unknown command: {name}")]
    CommandNotFound { name: String },

    /// The configured default command is not registered.
    #[error("default command not found: {name}")]
    DefaultCommandNotFound { name: String },

    /// Help was requested on a command whose help flag is hidden.
    #[error("flag: help requested")]
    HelpRequested,

    /// Unknown option or malformed option value.
    #[error(transparent)]
    OptionParse(OptionError),

    /// Error returned by a command's action, passed through untouched.
    #[error(transparent)]
    Action(anyhow::Error),

    /// Writing to the output sink failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl From<OptionError> for CliError {
    fn from(err: OptionError) -> Self {
        match err {
            OptionError::HelpRequested => CliError::HelpRequested,
            invalid => CliError::OptionParse(invalid),
        }
    }
}

impl CliError {
    /// Whether this is one of the "command not found" kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CliError::CommandNotFound { .. } | CliError::DefaultCommandNotFound { .. }
        )
    }

    /// Whether this error was already explained on the output sink.
    pub fn is_reported(&self) -> bool {
        self.is_not_found() || matches!(self, CliError::OptionParse(_))
    }

    /// Process exit code for this error.
    ///
    /// Usage mistakes exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::CommandNotFound { .. }
            | CliError::DefaultCommandNotFound { .. }
            | CliError::HelpRequested
            | CliError::OptionParse(_) => 2,
            CliError::Action(_) | CliError::Io(_) => 1,
        }
    }
}
