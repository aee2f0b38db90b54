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

//! Loaded source maps, one per program.

use avmdbg_common::{normalize_path_and_casing, FileAccessor};
use tracing::debug;

use super::{ProgramSourceEntry, ProgramSourceMap};
use crate::{DecodeError, DecodeResultExt};

/// The source map of one program together with the program's hash.
///
/// All paths are normalized for the host's casing rules at load time.
#[derive(Debug, Clone)]
pub struct ProgramSourceDescriptor {
    sourcemap_location: String,
    sourcemap: ProgramSourceMap,
    hash: Vec<u8>,
    source_paths: Vec<String>,
}

impl ProgramSourceDescriptor {
    /// Read and parse the source map of a manifest entry.
    ///
    /// `origin_path` is the manifest file; the entry's location is resolved against it.
    pub async fn load<A: FileAccessor>(
        accessor: &A,
        origin_path: &str,
        entry: &ProgramSourceEntry,
    ) -> Result<Self, DecodeError> {
        let Some(relative) = entry.sourcemap_location() else {
            return Err(DecodeError::malformed(format!(
                "program {} has no source map location",
                hex::encode(entry.hash())
            )));
        };

        let case_insensitive = accessor.is_host_case_insensitive();
        let location = normalize_path_and_casing(
            case_insensitive,
            &accessor.resolve_relative_path(origin_path, relative),
        );
        debug!(hash = %hex::encode(entry.hash()), %location, "loading source map");

        let raw = accessor
            .read_file(&location)
            .await
            .map_err(|e| {
                DecodeError::io(format!("Could not read source map file '{location}'"), e)
            })?;
        let sourcemap = ProgramSourceMap::from_slice(&raw)
            .with_decode_context(|| format!("Could not parse source map file '{location}'"))?;

        let source_paths = sourcemap
            .sources()
            .iter()
            .map(|source| {
                normalize_path_and_casing(
                    case_insensitive,
                    &accessor.resolve_relative_path(&location, source),
                )
            })
            .collect();

        Ok(Self {
            sourcemap_location: location,
            sourcemap,
            hash: entry.hash().to_vec(),
            source_paths,
        })
    }

    /// Normalized path of the source map file.
    pub fn sourcemap_location(&self) -> &str {
        &self.sourcemap_location
    }

    /// The parsed source map.
    pub fn sourcemap(&self) -> &ProgramSourceMap {
        &self.sourcemap
    }

    /// Raw program hash.
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Source paths as declared by the map, relative to the map file.
    pub fn sources(&self) -> &[String] {
        self.sourcemap.sources()
    }

    /// Normalized full paths of every declared source, in declaration order.
    pub fn source_paths(&self) -> &[String] {
        &self.source_paths
    }

    /// Normalized full path of the source at `index`.
    pub fn full_source_path(&self, index: usize) -> Option<&str> {
        self.source_paths.get(index).map(String::as_str)
    }

    /// Whether the source map carries per-pc debug events.
    pub fn is_enriched(&self) -> bool {
        self.sourcemap.is_enriched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeErrorKind;
    use avmdbg_common::InMemoryFileAccessor;

    const MAP: &str = r#"{
        "version": 3,
        "sources": ["Approval.teal", "../lib/Util.teal"],
        "names": [],
        "mappings": "AAAA"
    }"#;

    #[tokio::test]
    async fn test_load_resolves_paths() {
        let accessor = InMemoryFileAccessor::new().with_file("/work/maps/app.map", MAP);
        let entry = ProgramSourceEntry::new(vec![7u8; 32], Some("maps/app.map".to_string()));

        let descriptor =
            ProgramSourceDescriptor::load(&accessor, "/work/sources.json", &entry).await.unwrap();

        assert_eq!(descriptor.sourcemap_location(), "/work/maps/app.map");
        assert_eq!(descriptor.hash(), &[7u8; 32]);
        assert_eq!(descriptor.sources(), &["Approval.teal", "../lib/Util.teal"]);
        assert_eq!(
            descriptor.source_paths(),
            &["/work/maps/Approval.teal", "/work/maps/../lib/Util.teal"]
        );
        assert_eq!(descriptor.full_source_path(0), Some("/work/maps/Approval.teal"));
        assert_eq!(descriptor.full_source_path(2), None);
        assert!(!descriptor.is_enriched());
    }

    #[tokio::test]
    async fn test_load_on_case_insensitive_host() {
        let accessor = InMemoryFileAccessor::with_case_insensitivity(true)
            .with_file(r"c:\work\maps\app.map", MAP);
        let entry = ProgramSourceEntry::new(vec![1u8], Some("Maps/App.map".to_string()));

        let descriptor = ProgramSourceDescriptor::load(&accessor, r"C:\Work\sources.json", &entry)
            .await
            .unwrap();

        assert_eq!(descriptor.sourcemap_location(), r"c:\work\maps\app.map");
        assert_eq!(descriptor.full_source_path(0), Some(r"c:\work\maps\approval.teal"));
        assert_eq!(accessor.reads(), vec![r"c:\work\maps\app.map".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_failure() {
        let accessor = InMemoryFileAccessor::new();
        let entry = ProgramSourceEntry::new(vec![1u8], Some("a.map".to_string()));

        let err = ProgramSourceDescriptor::load(&accessor, "/work/sources.json", &entry)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
        assert!(err
            .to_string()
            .starts_with("Could not read source map file '/work/a.map': ENOENT"));
    }

    #[tokio::test]
    async fn test_invalid_map_names_file() {
        let accessor = InMemoryFileAccessor::new().with_file("/work/a.map", "{");
        let entry = ProgramSourceEntry::new(vec![1u8], Some("a.map".to_string()));

        let err = ProgramSourceDescriptor::load(&accessor, "/work/sources.json", &entry)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::MalformedInput);
        assert!(err.to_string().starts_with("Could not parse source map file '/work/a.map': "));
    }
}
