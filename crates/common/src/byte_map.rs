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

//! Byte-keyed map.
//!
//! Program hashes and addresses are looked up by content, never by the identity of the buffer
//! holding them. Every binary key is canonicalized into a [`HexKey`] (lowercase hex text) before
//! it touches storage, so two buffers with the same bytes always address the same entry.

use std::{collections::HashMap, fmt, sync::Arc};

/// Canonical storage key of a [`ByteMap`]: the lowercase hex encoding of the key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexKey(String);

impl HexKey {
    /// Canonicalize raw bytes into a key.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse hex text into a key. Upper-case digits are accepted and folded to lowercase.
    pub fn parse(text: &str) -> Result<Self, hex::FromHexError> {
        let lowered = text.to_ascii_lowercase();
        hex::decode(&lowered)?;
        Ok(Self(lowered))
    }

    /// Decode the key back into bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Every constructor validates the text, so decoding cannot fail.
        hex::decode(&self.0).unwrap_or_default()
    }

    /// The canonical hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&[u8]> for HexKey {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// A map keyed by byte sequences, compared by content.
///
/// Every operation has a binary-key form and a [`HexKey`] form working on the same storage, so
/// callers already holding a hex key skip the encode/decode round trip.
///
/// Values are held behind [`Arc`]: cloning the map copies the key storage and shares every
/// value with the original. Iteration follows insertion order; replacing a value keeps the
/// entry's original position.
#[derive(Debug)]
pub struct ByteMap<V> {
    slots: HashMap<HexKey, usize>,
    entries: Vec<(HexKey, Arc<V>)>,
}

impl<V> Default for ByteMap<V> {
    fn default() -> Self {
        Self { slots: HashMap::new(), entries: Vec::new() }
    }
}

impl<V> Clone for ByteMap<V> {
    fn clone(&self) -> Self {
        let entries =
            self.entries.iter().map(|(key, value)| (key.clone(), Arc::clone(value))).collect();
        Self { slots: self.slots.clone(), entries }
    }
}

impl<V> ByteMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value, returning the previous value for the same key content.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: V) -> Option<Arc<V>> {
        self.set_shared(HexKey::from_bytes(key), Arc::new(value))
    }

    /// Insert a value under a hex key.
    pub fn set_hex(&mut self, key: HexKey, value: V) -> Option<Arc<V>> {
        self.set_shared(key, Arc::new(value))
    }

    /// Insert an already shared value under a hex key.
    pub fn set_shared(&mut self, key: HexKey, value: Arc<V>) -> Option<Arc<V>> {
        if let Some(&slot) = self.slots.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.slots.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Look up a value by key content.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        self.get_shared(&HexKey::from_bytes(key)).map(Arc::as_ref)
    }

    /// Look up a value by hex key.
    pub fn get_hex(&self, key: &HexKey) -> Option<&V> {
        self.get_shared(key).map(Arc::as_ref)
    }

    /// Look up the shared handle of a value by hex key.
    pub fn get_shared(&self, key: &HexKey) -> Option<&Arc<V>> {
        self.slots.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Whether a key with this content exists.
    pub fn has(&self, key: impl AsRef<[u8]>) -> bool {
        self.slots.contains_key(&HexKey::from_bytes(key))
    }

    /// Whether the hex key exists.
    pub fn has_hex(&self, key: &HexKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Remove an entry, returning its value.
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Option<Arc<V>> {
        self.delete_hex(&HexKey::from_bytes(key))
    }

    /// Remove an entry by hex key, returning its value. Later entries keep their relative order.
    pub fn delete_hex(&mut self, key: &HexKey) -> Option<Arc<V>> {
        let slot = self.slots.remove(key)?;
        let (_, value) = self.entries.remove(slot);
        for (moved, _) in &self.entries[slot..] {
            if let Some(index) = self.slots.get_mut(moved) {
                *index -= 1;
            }
        }
        Some(value)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.entries.clear();
    }

    /// Iterate over entries with the keys decoded back into bytes.
    pub fn entries(&self) -> impl Iterator<Item = (Vec<u8>, &V)> + '_ {
        self.entries.iter().map(|(key, value)| (key.to_bytes(), value.as_ref()))
    }

    /// Iterate over entries with their canonical hex keys.
    pub fn entries_hex(&self) -> impl Iterator<Item = (&HexKey, &V)> + '_ {
        self.entries.iter().map(|(key, value)| (key, value.as_ref()))
    }

    /// Iterate over values.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, value)| value.as_ref())
    }

    /// Iterate over the shared handles of the values.
    pub fn shared_values(&self) -> impl Iterator<Item = &Arc<V>> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for ByteMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}
