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

//! Program sources manifest.
//!
//! The manifest lists, for every program of a transaction group, the program hash and where its
//! source map lives:
//!
//! ```json
//! {
//!   "txn-group-sources": [
//!     { "hash": "<base64>", "sourcemap-location": "approval.teal.map" },
//!     { "hash": "<base64>", "sourcemap-location": null }
//!   ]
//! }
//! ```
//!
//! Validation is done in full before any file is touched, and every problem found is reported
//! in a single [`DecodeError::ManifestShapeInvalid`].

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;

use crate::DecodeError;

/// Field holding the entry list.
pub const TXN_GROUP_SOURCES_FIELD: &str = "txn-group-sources";
/// Entry field holding the base64 program hash.
pub const HASH_FIELD: &str = "hash";
/// Entry field holding the source map path, or `null`.
pub const SOURCEMAP_LOCATION_FIELD: &str = "sourcemap-location";

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSourceEntry {
    hash: Vec<u8>,
    sourcemap_location: Option<String>,
}

impl ProgramSourceEntry {
    /// Entry for a program hash and optional source map path.
    pub fn new(hash: impl Into<Vec<u8>>, sourcemap_location: Option<String>) -> Self {
        Self { hash: hash.into(), sourcemap_location }
    }

    /// Raw program hash.
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Source map path relative to the manifest, `None` when no source is available.
    pub fn sourcemap_location(&self) -> Option<&str> {
        self.sourcemap_location.as_deref()
    }
}

/// A validated program sources manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSourceManifest {
    entries: Vec<ProgramSourceEntry>,
}

impl ProgramSourceManifest {
    /// Manifest from already validated entries.
    pub fn new(entries: Vec<ProgramSourceEntry>) -> Self {
        Self { entries }
    }

    /// Validate manifest JSON. `origin` names the manifest file in error messages.
    pub fn from_value(value: &Value, origin: Option<&str>) -> Result<Self, DecodeError> {
        let mut problems = Vec::new();
        let mut entries = Vec::new();

        match value.get(TXN_GROUP_SOURCES_FIELD) {
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if let Some(entry) = validate_entry(index, item, &mut problems) {
                        entries.push(entry);
                    }
                }
            }
            Some(_) => problems.push(format!("'{TXN_GROUP_SOURCES_FIELD}' must be an array")),
            None => problems.push(format!("missing '{TXN_GROUP_SOURCES_FIELD}'")),
        }

        if !problems.is_empty() {
            let origin = describe_origin(origin);
            return Err(DecodeError::ManifestShapeInvalid { origin, problems });
        }
        Ok(Self { entries })
    }

    /// Parse and validate manifest file contents.
    pub fn from_slice(bytes: &[u8], origin: Option<&str>) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            DecodeError::malformed(e.to_string()).context(format!(
                "Could not parse program sources description {}",
                describe_origin(origin)
            ))
        })?;
        Self::from_value(&value, origin)
    }

    /// Every entry, in manifest order.
    pub fn entries(&self) -> &[ProgramSourceEntry] {
        &self.entries
    }

    /// Entries that point at a source map.
    pub fn entries_with_sourcemap(&self) -> impl Iterator<Item = &ProgramSourceEntry> + '_ {
        self.entries.iter().filter(|entry| entry.sourcemap_location.is_some())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe_origin(origin: Option<&str>) -> String {
    match origin {
        Some(path) if !path.is_empty() => format!("file from '{path}'"),
        _ => "content".to_string(),
    }
}

fn validate_entry(
    index: usize,
    item: &Value,
    problems: &mut Vec<String>,
) -> Option<ProgramSourceEntry> {
    let Some(fields) = item.as_object() else {
        problems.push(format!("entry {index} is not an object"));
        return None;
    };

    let hash = match fields.get(HASH_FIELD) {
        Some(Value::String(text)) => match STANDARD.decode(text) {
            Ok(hash) => Some(hash),
            Err(e) => {
                problems.push(format!("entry {index}: '{HASH_FIELD}' is not valid base64: {e}"));
                None
            }
        },
        _ => {
            problems.push(format!("entry {index}: '{HASH_FIELD}' must be a string"));
            None
        }
    };

    let location = match fields.get(SOURCEMAP_LOCATION_FIELD) {
        Some(Value::String(path)) => Some(Some(path.clone())),
        Some(Value::Null) => Some(None),
        _ => {
            problems.push(format!(
                "entry {index}: '{SOURCEMAP_LOCATION_FIELD}' must be a string or null"
            ));
            None
        }
    };

    Some(ProgramSourceEntry { hash: hash?, sourcemap_location: location? })
}
