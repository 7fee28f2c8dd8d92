//! Error types for registry access

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("abi error: {0}")]
    Abi(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Stub(String),
}

impl RegistryError {
    pub(crate) fn abi(msg: impl Into<String>) -> Self {
        RegistryError::Abi(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        RegistryError::MalformedResponse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
