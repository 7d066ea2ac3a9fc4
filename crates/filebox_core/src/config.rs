//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve store location, quota and logging settings.
//!
//! # Invariants
//! - Precedence is explicit value > environment variable > default.
//! - Blank environment values count as unset.
//! - Resolved `log_dir` is always absolute.

use crate::logging::{default_log_level, normalize_level};
use crate::store::DEFAULT_QUOTA_BYTES;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_STORE_PATH: &str = "FILEBOX_STORE_PATH";
pub const ENV_QUOTA_BYTES: &str = "FILEBOX_QUOTA_BYTES";
pub const ENV_LOG_LEVEL: &str = "FILEBOX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FILEBOX_LOG_DIR";

const DEFAULT_STORE_FILE_NAME: &str = "filebox.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "filebox-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Quota is not a positive integer.
    InvalidQuota(String),
    InvalidLogLevel(String),
    /// Log directory must be absolute.
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuota(value) => {
                write!(f, "quota must be a positive number of bytes, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(path) => {
                write!(f, "log dir must be an absolute path, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Explicit values, typically from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub quota_bytes: Option<u64>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileboxConfig {
    pub store_path: PathBuf,
    pub quota_bytes: u64,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl FileboxConfig {
    /// Resolves settings against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves settings against a custom variable lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store_path = overrides
            .store_path
            .or_else(|| env(ENV_STORE_PATH).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_STORE_FILE_NAME));

        let quota_bytes = match overrides.quota_bytes {
            Some(0) => return Err(ConfigError::InvalidQuota("0".to_string())),
            Some(value) => value,
            None => match env(ENV_QUOTA_BYTES) {
                Some(raw) => parse_quota(&raw)?,
                None => DEFAULT_QUOTA_BYTES,
            },
        };

        let log_level = match overrides.log_level.or_else(|| env(ENV_LOG_LEVEL)) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = overrides
            .log_dir
            .or_else(|| env(ENV_LOG_DIR).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        Ok(Self {
            store_path,
            quota_bytes,
            log_level,
            log_dir,
        })
    }
}

fn parse_quota(raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidQuota(raw.to_string())),
    }
}
