//! CLI error type and exit code mapping.

use filebox_core::{ConfigError, FsError, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const EXIT_OPERATION_FAILED: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Store(StoreError),
    Fs(FsError),
    /// Reading an upload or writing a download failed.
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Node name has no usable final path component for a download target.
    NoLocalFileName(String),
    /// Writing to stdout failed.
    Output(std::io::Error),
    /// Destructive command run without `--yes`.
    ConfirmationRequired(&'static str),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ConfirmationRequired(_) => EXIT_USAGE,
            _ => EXIT_OPERATION_FAILED,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Store(err) => write!(f, "cannot open store: {err}"),
            Self::Fs(err) => write!(f, "{err}"),
            Self::File { path, source } => write!(f, "{}: {source}", path.display()),
            Self::NoLocalFileName(name) => write!(
                f,
                "cannot derive a local file name from `{name}`; pass --out"
            ),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
            Self::ConfirmationRequired(command) => {
                write!(f, "`{command}` cannot be undone; pass --yes to confirm")
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Fs(err) => Some(err),
            Self::File { source, .. } => Some(source),
            Self::Output(err) => Some(err),
            Self::NoLocalFileName(_) | Self::ConfirmationRequired(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<FsError> for CliError {
    fn from(value: FsError) -> Self {
        Self::Fs(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}
