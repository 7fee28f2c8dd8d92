//! Error types for LAND resolution

use land_registry::RegistryError;
use land_types::{Address, AddressError, Coordinate};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a resolver operation.
///
/// There is a single kind: every rejected, reverted or malformed registry
/// read ends up here with the operation's context prepended. A negative
/// authorization check is reported the same way, so callers cannot tell
/// "denied" from "could not check" by kind alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("{message}")]
    LedgerAccess { message: String },
}

impl ResolverError {
    /// `"<context>: <detail>"`
    pub fn ledger(context: &str, detail: impl fmt::Display) -> Self {
        ResolverError::LedgerAccess {
            message: format!("{context}: {detail}"),
        }
    }

    pub(crate) fn unauthorized(owner: &Address, coords: Coordinate) -> Self {
        ResolverError::LedgerAccess {
            message: format!(
                "Provided address {owner} is not authorized to update LAND {},{}",
                coords.x, coords.y
            ),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ResolverError::LedgerAccess { message } => message,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors raised while building configuration or wiring the resolver.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file {} not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("unknown network '{0}' (expected 'mainnet' or 'ropsten')")]
    UnknownNetwork(String),

    #[error("unknown log format '{0}' (expected 'pretty' or 'json')")]
    UnknownLogFormat(String),

    #[error("invalid {name} address: {source}")]
    InvalidAddress {
        name: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("invalid provider: {0}")]
    Provider(#[source] RegistryError),

    #[error("failed to install logging subscriber: {0}")]
    Logging(String),
}
