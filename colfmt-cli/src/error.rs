//! Error type for the colfmt CLI

use std::fmt;

/// Everything that can go wrong between reading a document and printing output.
#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Config(config::ConfigError),
    UnknownFormat(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "cannot read input: {}", err),
            CliError::Parse(err) => write!(f, "invalid token-stream document: {}", err),
            CliError::Config(err) => write!(f, "configuration error: {}", err),
            CliError::UnknownFormat(format) => {
                write!(f, "unknown output format '{}' (expected: text, json)", format)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Parse(err)
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err)
    }
}
