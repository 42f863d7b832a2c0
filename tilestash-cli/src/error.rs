//! CLI error type.

use std::fmt;

use tilestash::config::ConfigError;
use tilestash::package::PackageError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),

    /// A library operation failed.
    Library(tilestash::Error),

    /// A download ran but did not complete.
    DownloadFailed(String),

    /// The user declined to overwrite an existing package.
    Cancelled(String),

    /// Writing output failed.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Library(e) => write!(f, "{}", e),
            CliError::DownloadFailed(reason) => write!(f, "Download failed: {}", reason),
            CliError::Cancelled(what) => write!(f, "Cancelled: {}", what),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Config(_) | CliError::DownloadFailed(_) | CliError::Cancelled(_) => None,
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled(_) => 2,
            _ => 1,
        }
    }
}

impl From<tilestash::Error> for CliError {
    fn from(e: tilestash::Error) -> Self {
        CliError::Library(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Library(e.into())
    }
}

impl From<PackageError> for CliError {
    fn from(e: PackageError) -> Self {
        CliError::Library(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_errors_keep_their_message() {
        let err: CliError = ConfigError::UnknownKey("foo.bar".to_string()).into();
        assert_eq!(err.to_string(), "unknown config key 'foo.bar'");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cancelled_exit_code() {
        assert_eq!(CliError::Cancelled("overwrite".to_string()).exit_code(), 2);
        assert_eq!(CliError::DownloadFailed("x".to_string()).exit_code(), 1);
    }
}
