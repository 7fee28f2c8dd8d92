//! Error types for the metadata codec

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata field '{field}' contains the separator ','")]
    UnencodableField { field: &'static str },
}

pub type Result<T> = std::result::Result<T, MetadataError>;
