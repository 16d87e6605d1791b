//! Error reporting for the get-gecko-driver CLI.
//!
//! Library failures arrive as [`GeckoDriverError`] inside an `anyhow::Error`.
//! This module turns them into the one-line messages printed on stderr and
//! picks the exit code.

use std::error::Error as StdError;
use std::io::IsTerminal;
use std::path::PathBuf;

use crossterm::style::Stylize;
use gecko_driver::{GeckoDriverError, Platform};
use thiserror::Error;

/// Exit code for any failed action.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code after Ctrl+C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Failures raised by the command surface itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// The user pressed Ctrl+C.
    #[error("interrupted")]
    Interrupted,

    /// The driver was extracted but cannot be found through `PATH`.
    #[error("{binary} was installed to {} but cannot be found on PATH", dir.display())]
    NotOnPath {
        /// Driver file name.
        binary: String,
        /// Directory appended to `PATH`.
        dir: PathBuf,
    },
}

/// Maps an error to its exit code.
#[must_use]
pub fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<CliError>() {
        Some(CliError::Interrupted) => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}

/// Builds the message shown to the user, without styling.
#[must_use]
pub fn user_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<GeckoDriverError>() {
        Some(err) => describe(err),
        None => format!("error: {e:#}"),
    }
}

/// Builds the message for a library error.
#[must_use]
pub fn describe(err: &GeckoDriverError) -> String {
    match err {
        GeckoDriverError::UnknownPlatform { .. } => format!(
            "required: choose one of the following platforms: {}",
            Platform::supported_list()
        ),
        GeckoDriverError::UnknownVersion { version } if version.is_empty() => {
            "error: could not find the latest release version".to_string()
        }
        GeckoDriverError::UnknownVersion { .. } => format!("error: {err}"),
        GeckoDriverError::VersionUrl { version, platform } => {
            format!("error: could not find release url for version {version} on {platform}")
        }
        GeckoDriverError::DownloadError { message, .. } | GeckoDriverError::Archive { message, .. } => {
            format!(
                "error: an error occurred at downloading: {}",
                chain(message.clone(), err.source())
            )
        }
        GeckoDriverError::GetGeckoDriver { .. } => format!("error: {}", with_sources(err)),
    }
}

/// Prints the user message on stderr, in red when stderr is a terminal.
pub fn report(e: &anyhow::Error) {
    let message = user_message(e);
    if std::io::stderr().is_terminal() {
        eprintln!("{}", message.red());
    } else {
        eprintln!("{message}");
    }
}

/// Joins an error and its sources with `: `.
fn with_sources(err: &dyn StdError) -> String {
    chain(err.to_string(), err.source())
}

/// Appends `source` and its own sources to `text`, each after `: `.
fn chain(mut text: String, mut source: Option<&(dyn StdError + 'static)>) -> String {
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
