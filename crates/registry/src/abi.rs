//! Minimal contract ABI word codec.
//!
//! Covers the static argument types the registries take (`address`,
//! `uint256`, `int256`) and the return shapes they produce: single words,
//! `string`, and pairs of `int256[]`.

use crate::errors::*;
use land_types::{Address, AssetId, ADDRESS_BYTES};
use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// Call argument.
#[derive(Debug, Clone)]
pub enum Token {
    Address(Address),
    Uint([u8; WORD]),
    Int(i64),
}

impl Token {
    pub fn asset(asset: &AssetId) -> Result<Self> {
        asset
            .to_word()
            .map(Token::Uint)
            .map_err(|e| RegistryError::abi(e.to_string()))
    }

    pub fn uint(value: u64) -> Self {
        let mut word = [0u8; WORD];
        word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
        Token::Uint(word)
    }

    fn to_word(&self) -> [u8; WORD] {
        match self {
            Token::Address(address) => {
                let mut word = [0u8; WORD];
                word[WORD - ADDRESS_BYTES..].copy_from_slice(&address.to_bytes());
                word
            }
            Token::Uint(word) => *word,
            Token::Int(value) => {
                let fill = if *value < 0 { 0xff } else { 0x00 };
                let mut word = [fill; WORD];
                word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
                word
            }
        }
    }
}

/// First four bytes of the Keccak-256 hash of a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Selector followed by one word per (static) argument.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}

/// Cursor-free reader over call return data, addressed by head word index.
#[derive(Debug, Clone, Copy)]
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8; WORD]> {
        let end = offset
            .checked_add(WORD)
            .ok_or_else(|| RegistryError::malformed("word offset overflow"))?;
        self.data
            .get(offset..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| {
                RegistryError::malformed(format!(
                    "return data too short: need {end} bytes, have {}",
                    self.data.len()
                ))
            })
    }

    pub fn word(&self, index: usize) -> Result<&'a [u8; WORD]> {
        self.word_at(index * WORD)
    }

    pub fn uint(&self, index: usize) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.word(index)?))
    }

    pub fn asset(&self, index: usize) -> Result<AssetId> {
        Ok(AssetId::from_word(self.word(index)?))
    }

    pub fn u64(&self, index: usize) -> Result<u64> {
        word_to_u64(self.word(index)?)
    }

    pub fn int(&self, index: usize) -> Result<i64> {
        word_to_i64(self.word(index)?)
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        match word_to_u64(self.word(index)?)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(RegistryError::malformed(format!("invalid bool word {other}"))),
        }
    }

    pub fn address(&self, index: usize) -> Result<Address> {
        let word = self.word(index)?;
        let (padding, body) = word.split_at(WORD - ADDRESS_BYTES);
        if padding.iter().any(|b| *b != 0) {
            return Err(RegistryError::malformed("address word has dirty padding"));
        }
        let mut bytes = [0u8; ADDRESS_BYTES];
        bytes.copy_from_slice(body);
        Ok(Address::from_bytes(&bytes))
    }

    /// Dynamic `string` whose head word sits at `index`.
    pub fn string(&self, index: usize) -> Result<String> {
        let offset = self.offset(index)?;
        let len = to_usize(word_to_u64(self.word_at(offset)?)?)?;
        let start = offset + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| RegistryError::malformed("string runs past return data"))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RegistryError::malformed(format!("string is not utf-8: {e}")))
    }

    /// Dynamic `int256[]` whose head word sits at `index`.
    pub fn int_array(&self, index: usize) -> Result<Vec<i64>> {
        let offset = self.offset(index)?;
        let len = to_usize(word_to_u64(self.word_at(offset)?)?)?;
        (0..len)
            .map(|i| word_to_i64(self.word_at(offset + WORD + i * WORD)?))
            .collect()
    }

    fn offset(&self, index: usize) -> Result<usize> {
        to_usize(self.u64(index)?)
    }
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| RegistryError::malformed("length does not fit in memory"))
}

fn word_to_u64(word: &[u8; WORD]) -> Result<u64> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(RegistryError::malformed("uint256 value exceeds 64 bits"));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    Ok(u64::from_be_bytes(bytes))
}

fn word_to_i64(word: &[u8; WORD]) -> Result<i64> {
    let (high, low) = word.split_at(WORD - 8);
    let fill = if low[0] & 0x80 != 0 { 0xff } else { 0x00 };
    if high.iter().any(|b| *b != fill) {
        return Err(RegistryError::malformed("int256 value exceeds 64 bits"));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    Ok(i64::from_be_bytes(bytes))
}
