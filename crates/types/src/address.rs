use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a ledger address string.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with '0x'")]
    InvalidPrefix,
    #[error("address must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 20;
/// Expected string length of an encoded address (`0x` + 40 hex chars).
pub const ADDRESS_STRING_LENGTH: usize = 2 + ADDRESS_BYTES * 2;

/// Decode a `0x`-prefixed address string into its raw bytes.
///
/// Hex digits are accepted in either case.
pub fn decode_address(address: &str) -> Result<[u8; ADDRESS_BYTES], AddressError> {
    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(AddressError::InvalidPrefix);
    }

    if address.len() != ADDRESS_STRING_LENGTH {
        return Err(AddressError::InvalidLength {
            expected: ADDRESS_STRING_LENGTH,
            actual: address.len(),
        });
    }

    let mut bytes = [0u8; ADDRESS_BYTES];
    hex::decode_to_slice(&address[2..], &mut bytes)?;
    Ok(bytes)
}

/// Check whether the provided string is a well-formed address.
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

/// A ledger account address.
///
/// The textual form is kept exactly as supplied. Registries differ in how
/// they compare addresses (the LAND registry is case-sensitive), so case is
/// only changed when a caller asks for it via [`Address::to_lowercase`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address, preserving its case.
    pub fn parse(value: impl Into<String>) -> Result<Self, AddressError> {
        let value = value.into();
        decode_address(&value)?;
        Ok(Address(value))
    }

    /// Build the canonical lowercase form from raw bytes.
    pub fn from_bytes(bytes: &[u8; ADDRESS_BYTES]) -> Self {
        let mut encoded = String::with_capacity(ADDRESS_STRING_LENGTH);
        encoded.push_str("0x");
        encoded.push_str(&hex::encode(bytes));
        Address(encoded)
    }

    /// The all-zero address, used by registries for "no operator".
    pub fn zero() -> Self {
        Self::from_bytes(&[0u8; ADDRESS_BYTES])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES] {
        let mut bytes = [0u8; ADDRESS_BYTES];
        // Validated on construction.
        let _ = hex::decode_to_slice(&self.0[2..], &mut bytes);
        bytes
    }

    /// Lowercase copy of this address (prefix included).
    pub fn to_lowercase(&self) -> Self {
        Address(self.0.to_ascii_lowercase())
    }

    pub fn is_zero(&self) -> bool {
        self.to_bytes() == [0u8; ADDRESS_BYTES]
    }

    /// Byte-level equality, ignoring the case of hex digits.
    pub fn same_account(&self, other: &Address) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(value)
    }
}
