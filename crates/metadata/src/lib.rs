//! Legacy LAND metadata codec.
//!
//! Registries store metadata as one string: a version marker followed by two
//! quoted fields, all comma separated (`0,"name","description"`). The format
//! has no escaping. A comma inside a field, or a quote at either end of one,
//! changes how the string splits, so such values cannot be stored faithfully.

pub mod codec;
pub mod errors;

pub use codec::{decode, encode, FIELD_DELIMITER, FIELD_SEPARATOR};
pub use errors::*;
