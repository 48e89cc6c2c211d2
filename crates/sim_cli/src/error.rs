//! CLI error taxonomy (SPEC_FULL §7): configuration problems exit 2,
//! runtime problems exit 1. Mirrors `sim_core::config::ConfigError`'s
//! `thiserror` style rather than reaching for a catch-all `anyhow::Error`,
//! since this is a small, closed set of named failure modes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path} as INI: {source}")]
    IniParse {
        path: String,
        #[source]
        source: ini::Error,
    },

    #[error("invalid override {key}={value}: {reason}")]
    InvalidOverride {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid impulse record in [IMPULSES].{key}: {reason}")]
    InvalidImpulse { key: String, reason: String },

    #[error(transparent)]
    Config(#[from] sim_core::config::ConfigError),

    #[error("failed to write results: {0}")]
    Output(std::io::Error),
}

impl CliError {
    /// Exit code per SPEC_FULL §7: everything here is a configuration
    /// problem (2) except a post-run output failure (1).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Output(_) => 1,
            _ => 2,
        }
    }
}
