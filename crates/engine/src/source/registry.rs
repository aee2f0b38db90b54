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

//! Content-addressed registry of program source descriptors.

use std::sync::Arc;

use avmdbg_common::{ByteMap, FileAccessor, HexKey};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::debug;

use super::{ProgramSourceDescriptor, ProgramSourceManifest};
use crate::DecodeError;

/// Program source descriptors keyed by program hash.
///
/// Built once from a manifest and read-only afterwards. Programs listed without a source map
/// are absent.
#[derive(Debug, Clone, Default)]
pub struct ProgramSourceRegistry {
    descriptors: ByteMap<ProgramSourceDescriptor>,
}

impl ProgramSourceRegistry {
    /// Registry over already loaded descriptors.
    pub fn new(descriptors: impl IntoIterator<Item = ProgramSourceDescriptor>) -> Self {
        let descriptors = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.hash().to_vec(), descriptor))
            .collect();
        Self { descriptors }
    }

    /// Load the source map of every manifest entry that has one, concurrently.
    ///
    /// Locations are resolved against `origin`, the manifest file. Any failing entry fails the
    /// whole load.
    pub async fn load<A: FileAccessor>(
        accessor: &A,
        manifest: &ProgramSourceManifest,
        origin: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let origin_path = origin.unwrap_or_default();
        let loads = manifest
            .entries_with_sourcemap()
            .map(|entry| ProgramSourceDescriptor::load(accessor, origin_path, entry));
        let descriptors = try_join_all(loads).await?;

        debug!(
            loaded = descriptors.len(),
            skipped = manifest.len() - descriptors.len(),
            "program source registry built"
        );
        Ok(Self::new(descriptors))
    }

    /// Validate manifest JSON, then [`Self::load`] it.
    ///
    /// An invalid manifest fails before any file is read.
    pub async fn load_from_value<A: FileAccessor>(
        accessor: &A,
        manifest: &Value,
        origin: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let manifest = ProgramSourceManifest::from_value(manifest, origin)?;
        Self::load(accessor, &manifest, origin).await
    }

    /// Descriptor of the program with this hash.
    pub fn find_by_hash(&self, hash: &[u8]) -> Option<&Arc<ProgramSourceDescriptor>> {
        self.find_by_hex(&HexKey::from_bytes(hash))
    }

    /// Descriptor of the program with this hex-encoded hash.
    pub fn find_by_hex(&self, hash: &HexKey) -> Option<&Arc<ProgramSourceDescriptor>> {
        self.descriptors.get_shared(hash)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no program has a descriptor.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Every descriptor, in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProgramSourceDescriptor>> + '_ {
        self.descriptors.shared_values()
    }
}
