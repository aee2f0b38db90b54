// AVMDBG - Algorand Virtual Machine Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Algorand account addresses.
//!
//! The text form of an address is the unpadded RFC 4648 base32 encoding of the 32-byte public
//! key followed by a 4-byte checksum, the last four bytes of SHA-512/256 over the key.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};

/// Length of a public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Length of the checksum appended to the key in the text form.
pub const CHECKSUM_LENGTH: usize = 4;
/// Length of the text form.
pub const ADDRESS_TEXT_LENGTH: usize = 58;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Reasons an address cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Raw key of the wrong size
    #[error("public key must be {PUBLIC_KEY_LENGTH} bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Text of the wrong size or outside the base32 alphabet
    #[error("address is malformed: {0}")]
    Malformed(String),
    /// Text decodes but the checksum does not match the key
    #[error("address checksum mismatch: {0}")]
    ChecksumMismatch(String),
}

/// A 32-byte account public key, displayed in its checksummed text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; PUBLIC_KEY_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0; PUBLIC_KEY_LENGTH]);

    /// Wrap a public key.
    pub const fn new(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(public_key)
    }

    /// Wrap a public key given as a slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let key = <[u8; PUBLIC_KEY_LENGTH]>::try_from(bytes)
            .map_err(|_| AddressError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(key))
    }

    /// The public key.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// The checksummed text form.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&checksum(&self.0));
        base32_encode(&raw)
    }
}

fn checksum(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
    out
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for c in text.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    // Leftover bits are padding and must be zero.
    if buffer & ((1 << bits) - 1) != 0 {
        return None;
    }
    Some(out)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.len() != ADDRESS_TEXT_LENGTH {
            return Err(AddressError::Malformed(text.to_string()));
        }
        let raw = base32_decode(text).ok_or_else(|| AddressError::Malformed(text.to_string()))?;
        if raw.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(AddressError::Malformed(text.to_string()));
        }
        let address = Self::from_slice(&raw[..PUBLIC_KEY_LENGTH])?;
        if raw[PUBLIC_KEY_LENGTH..] != checksum(&address.0) {
            return Err(AddressError::ChecksumMismatch(text.to_string()));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AddressVisitor;

        impl de::Visitor<'_> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an address string or a 32-byte public key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Address, E> {
                Address::from_slice(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";
    const SEQUENTIAL_ADDRESS: &str = "AAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYP7MUPJQE";

    fn sequential_key() -> [u8; 32] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn test_encode_known_addresses() {
        assert_eq!(Address::ZERO.encode(), ZERO_ADDRESS);
        assert_eq!(Address::new(sequential_key()).to_string(), SEQUENTIAL_ADDRESS);
    }

    #[test]
    fn test_parse_known_addresses() {
        assert_eq!(ZERO_ADDRESS.parse::<Address>().unwrap(), Address::ZERO);
        assert_eq!(
            SEQUENTIAL_ADDRESS.parse::<Address>().unwrap().public_key(),
            &sequential_key()
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let mut tampered = SEQUENTIAL_ADDRESS.to_string();
        tampered.replace_range(0..1, "B");
        assert!(matches!(tampered.parse::<Address>(), Err(AddressError::ChecksumMismatch(_))));

        assert!(matches!("SHORT".parse::<Address>(), Err(AddressError::Malformed(_))));
        let lowercase = ZERO_ADDRESS.to_lowercase();
        assert!(matches!(lowercase.parse::<Address>(), Err(AddressError::Malformed(_))));
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert_eq!(Address::from_slice(&[0; 31]), Err(AddressError::InvalidKeyLength(31)));
        assert_eq!(Address::from_slice(&[0; 32]).unwrap(), Address::ZERO);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&Address::ZERO).unwrap();
        assert_eq!(json, format!("\"{ZERO_ADDRESS}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Address::ZERO);
    }
}
