//! Shared value types for LAND parcel and Estate resolution.
//!
//! Everything here is plain data: addresses as supplied by callers, parcel
//! coordinates, registry token identifiers and the decoded metadata record.

pub mod address;
pub mod coordinate;
pub mod ids;
pub mod metadata;

pub use address::*;
pub use coordinate::*;
pub use ids::*;
pub use metadata::*;
