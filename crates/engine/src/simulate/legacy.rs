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

//! Rewrite of legacy simulate responses.
//!
//! Older tooling wrote simulate responses as plain JSON in which transaction fields keep the
//! protocol's abbreviated names and every binary value, addresses included, is base64 text.
//! The rewrite walks such a document depth-first, in document order, and produces an
//! [`EncodedValue`] tree in which those fields hold bytes or address text.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tracing::trace;

use super::{Address, EncodedValue};
use crate::DecodeError;

/// Version of the [`LEGACY_ADDRESS_FIELDS`] / [`LEGACY_BINARY_FIELDS`] contract.
///
/// Other tools parse legacy responses with the same two lists. Any change to either list must
/// bump this version and be mirrored by those tools.
pub const LEGACY_FIELD_SET_VERSION: u32 = 1;

/// Fields holding an account address as base64 of the 32-byte public key.
pub const LEGACY_ADDRESS_FIELDS: &[&str] = &[
    "snd",    // sender
    "close",  // close remainder to (payment)
    "aclose", // asset close to (asset transfer)
    "rekey",  // rekey to
    "rcv",    // receiver (payment)
    "arcv",   // asset receiver (asset transfer)
    "fadd",   // freeze account (asset freeze)
    "asnd",   // asset sender (clawback)
    "m",      // manager (asset config)
    "r",      // reserve (asset config)
    "f",      // freeze (asset config)
    "c",      // clawback (asset config)
];

/// Fields holding base64 binary data, or a list of it.
pub const LEGACY_BINARY_FIELDS: &[&str] = &[
    "gh",   // genesis hash
    "apaa", // application arguments
    "apap", // approval program
    "note", // note
    "lx",   // lease
    "grp",  // group id
    "apsu", // clear state program
    "am",   // asset metadata hash
    "n",    // box name
];

/// How the rewrite treats the value of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFieldKind {
    /// Best-effort conversion to address text
    Address,
    /// Base64 text to bytes
    Binary,
    /// Left as is, recursing into containers
    Plain,
}

impl LegacyFieldKind {
    /// Classify a record key.
    pub fn of(key: &str) -> Self {
        if LEGACY_ADDRESS_FIELDS.contains(&key) {
            Self::Address
        } else if LEGACY_BINARY_FIELDS.contains(&key) {
            Self::Binary
        } else {
            Self::Plain
        }
    }
}

/// Rewrite a legacy document into an [`EncodedValue`] tree.
///
/// Fails only when a binary field holds text that is not base64.
pub fn rewrite_legacy_document(document: Value) -> Result<EncodedValue, DecodeError> {
    rewrite_value(document)
}

fn rewrite_value(value: Value) -> Result<EncodedValue, DecodeError> {
    match value {
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let value = rewrite_field(&key, value)?;
                entries.push((key, value));
            }
            Ok(EncodedValue::Record(entries))
        }
        Value::Array(items) => items
            .into_iter()
            .map(rewrite_value)
            .collect::<Result<Vec<_>, DecodeError>>()
            .map(EncodedValue::List),
        scalar => Ok(EncodedValue::from_json(scalar)),
    }
}

fn rewrite_field(key: &str, value: Value) -> Result<EncodedValue, DecodeError> {
    match (LegacyFieldKind::of(key), value) {
        (LegacyFieldKind::Address, Value::String(text)) => {
            Ok(EncodedValue::Text(address_text(key, text)))
        }
        (LegacyFieldKind::Binary, Value::String(text)) => decode_binary(key, &text),
        (LegacyFieldKind::Binary, Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => decode_binary(key, &text),
                other => Ok(EncodedValue::from_json(other)),
            })
            .collect::<Result<Vec<_>, DecodeError>>()
            .map(EncodedValue::List),
        (_, value) => rewrite_value(value),
    }
}

/// Address text for base64 of a public key. Anything that does not decode to a 32-byte key is
/// returned unchanged: address conversion only improves readability.
fn address_text(key: &str, text: String) -> String {
    let address = STANDARD
        .decode(&text)
        .map_err(|e| e.to_string())
        .and_then(|bytes| Address::from_slice(&bytes).map_err(|e| e.to_string()));
    match address {
        Ok(address) => address.encode(),
        Err(reason) => {
            trace!(field = key, %reason, "keeping legacy address field as text");
            text
        }
    }
}

fn decode_binary(key: &str, text: &str) -> Result<EncodedValue, DecodeError> {
    STANDARD
        .decode(text)
        .map(EncodedValue::Bytes)
        .map_err(|e| DecodeError::malformed(format!("field '{key}' is not valid base64: {e}")))
}
