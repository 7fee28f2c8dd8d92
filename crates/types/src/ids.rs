//! Registry token identifiers.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced when converting identifiers.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("invalid decimal token id '{0}'")]
    InvalidDecimal(String),
    #[error("token id does not fit in 256 bits")]
    TooWide,
}

/// Opaque LAND token identifier.
///
/// Only the LAND registry knows how coordinates map onto these values; the
/// resolver just carries them between calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(BigUint);

impl AssetId {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Interpret a big-endian 32-byte word.
    pub fn from_word(word: &[u8; 32]) -> Self {
        Self(BigUint::from_bytes_be(word))
    }

    /// Big-endian 32-byte word, left padded with zeroes.
    pub fn to_word(&self) -> Result<[u8; 32], IdError> {
        let bytes = self.0.to_bytes_be();
        if bytes.len() > 32 {
            return Err(IdError::TooWide);
        }
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(word)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for AssetId {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(AssetId)
            .ok_or_else(|| IdError::InvalidDecimal(s.to_string()))
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for AssetId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Estate token identifier. Zero means "not part of any estate".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EstateId(pub u64);

impl EstateId {
    pub const NONE: EstateId = EstateId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Narrow a registry word; fails for values above `u64::MAX`.
    pub fn from_biguint(value: &BigUint) -> Option<Self> {
        value.to_u64().map(EstateId)
    }
}

impl From<u64> for EstateId {
    fn from(value: u64) -> Self {
        EstateId(value)
    }
}

impl fmt::Display for EstateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_word_is_left_padded() {
        let id = AssetId::from(0x0102u64);
        let word = id.to_word().unwrap();
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x01, 0x02]);
        assert_eq!(AssetId::from_word(&word), id);
    }

    #[test]
    fn asset_id_serializes_as_decimal() {
        let id: AssetId = "340282366920938463463374607431768211457".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"340282366920938463463374607431768211457\"");
    }

    #[test]
    fn estate_zero_is_none() {
        assert!(EstateId::NONE.is_none());
        assert!(!EstateId(7).is_none());
        assert_eq!(EstateId::from_biguint(&BigUint::from(7u8)), Some(EstateId(7)));
        assert_eq!(EstateId::from_biguint(&(BigUint::from(u64::MAX) + 1u8)), None);
    }
}
