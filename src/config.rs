//! Run configuration: source/destination selection, credentials, run mode.
//!
//! The CLI layer builds these values and threads them into the backend
//! constructors. Backends never read ambient process state themselves;
//! credentials arrive as an explicit [`S3Credentials`] value resolved once at
//! startup.

use std::fmt;
use std::path::PathBuf;

/// Object-storage credentials, threaded explicitly through configuration.
#[derive(Debug, Clone)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Credentials {
    /// Resolve credentials from the conventional environment variables.
    ///
    /// This is the only place the process environment is consulted; the
    /// resulting value is passed down by hand so tests can substitute fakes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| ConfigError::MissingCredential { variable: "AWS_ACCESS_KEY_ID" })?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| ConfigError::MissingCredential { variable: "AWS_SECRET_ACCESS_KEY" })?;
        Ok(Self { access_key_id, secret_access_key })
    }
}

/// Where to read media from.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    Filesystem {
        root: PathBuf,
    },
    ObjectStore {
        bucket: String,
        region: String,
        prefix: String,
        credentials: S3Credentials,
    },
    Feed {
        /// Board/category identifier, e.g. `wsg`.
        board: String,
        /// Case-insensitive substring matched against thread titles.
        search: String,
    },
}

/// Where to write media to.
#[derive(Debug, Clone)]
pub enum DestinationSpec {
    Filesystem {
        root: PathBuf,
    },
    ObjectStore {
        bucket: String,
        region: String,
        prefix: String,
        credentials: S3Credentials,
    },
}

/// How far the pipeline is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Scan, diff, and transfer.
    #[default]
    Full,
    /// Stop after reporting the plan; no bytes move.
    Dry,
    /// Stop before any scanning; zero I/O against real storage.
    UltraDry,
}

impl RunMode {
    pub fn from_flags(dry: bool, ultradry: bool) -> Self {
        // Ultradry is the stricter of the two and wins when both are set.
        if ultradry {
            RunMode::UltraDry
        } else if dry {
            RunMode::Dry
        } else {
            RunMode::Full
        }
    }
}

/// Configuration errors, fatal at startup and never retried.
#[derive(Debug)]
pub enum ConfigError {
    /// A kind-specific field the selected backend requires was not supplied.
    MissingField { kind: &'static str, field: &'static str },
    /// A required credential variable is absent from the environment.
    MissingCredential { variable: &'static str },
    /// The source/destination kind selector is not one this tool knows.
    UnknownKind { role: &'static str, given: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingField { kind, field } => {
                writeln!(f, "Missing required argument for {} initialization: {}", kind, field)?;
                write!(f, "Suggestion: pass --{} (see --help for the full flag list)", field)
            }
            ConfigError::MissingCredential { variable } => {
                writeln!(f, "Missing {} in environment variables", variable)?;
                write!(
                    f,
                    "Suggestion: export {} before running with an object-store source or destination",
                    variable
                )
            }
            ConfigError::UnknownKind { role, given } => {
                writeln!(f, "Invalid {} type: {}", role, given)?;
                write!(f, "Suggestion: valid source kinds are fs, s3, feed; destination kinds are fs, s3")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_flags() {
        assert_eq!(RunMode::from_flags(false, false), RunMode::Full);
        assert_eq!(RunMode::from_flags(true, false), RunMode::Dry);
        assert_eq!(RunMode::from_flags(false, true), RunMode::UltraDry);
        assert_eq!(RunMode::from_flags(true, true), RunMode::UltraDry);
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let err = ConfigError::MissingField { kind: "feed source", field: "search" };
        let message = err.to_string();
        assert!(message.contains("feed source"));
        assert!(message.contains("search"));
        assert!(message.contains("Suggestion:"));
    }

    #[test]
    fn test_missing_credential_names_the_variable() {
        let err = ConfigError::MissingCredential { variable: "AWS_ACCESS_KEY_ID" };
        assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    }
}
