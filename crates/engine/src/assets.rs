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

//! Debugging assets: a decoded simulate trace paired with the program source registry.
//!
//! This is what a debugger session starts from. The trace side and the registry side are
//! loaded concurrently; either failing fails the whole load.

use avmdbg_common::FileAccessor;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    decode, DecodeError, DecodeResultExt, ProgramSourceManifest, ProgramSourceRegistry,
    SimulateResponse,
};

/// A validated simulate response and the source maps of its programs.
#[derive(Debug, Clone)]
pub struct DebuggingAssets {
    simulate_response: SimulateResponse,
    registry: ProgramSourceRegistry,
}

impl DebuggingAssets {
    /// Pair an already decoded response with a registry.
    pub fn new(simulate_response: SimulateResponse, registry: ProgramSourceRegistry) -> Self {
        Self { simulate_response, registry }
    }

    /// Load the trace file at `trace_path` and build the registry from manifest JSON.
    ///
    /// `manifest_location` is the manifest file path that source map locations are relative
    /// to. The manifest is validated before any file is read.
    pub async fn load<A: FileAccessor>(
        accessor: &A,
        trace_path: &str,
        manifest: &Value,
        manifest_location: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let manifest = ProgramSourceManifest::from_value(manifest, manifest_location)?;

        let (simulate_response, registry) = futures::try_join!(
            load_simulate_trace(accessor, trace_path),
            ProgramSourceRegistry::load(accessor, &manifest, manifest_location),
        )?;

        info!(trace = trace_path, programs = registry.len(), "debugging assets loaded");
        Ok(Self { simulate_response, registry })
    }

    /// Load both the trace file and the manifest file.
    ///
    /// Source map locations are resolved against `manifest_path`.
    pub async fn load_from_files<A: FileAccessor>(
        accessor: &A,
        trace_path: &str,
        manifest_path: &str,
    ) -> Result<Self, DecodeError> {
        let registry = async {
            let raw = accessor.read_file(manifest_path).await.map_err(|e| {
                DecodeError::io(
                    format!("Could not read program sources description file '{manifest_path}'"),
                    e,
                )
            })?;
            let manifest = ProgramSourceManifest::from_slice(&raw, Some(manifest_path))?;
            ProgramSourceRegistry::load(accessor, &manifest, Some(manifest_path)).await
        };

        let (simulate_response, registry) =
            futures::try_join!(load_simulate_trace(accessor, trace_path), registry)?;

        info!(trace = trace_path, programs = registry.len(), "debugging assets loaded");
        Ok(Self { simulate_response, registry })
    }

    /// The decoded simulate response.
    pub fn simulate_response(&self) -> &SimulateResponse {
        &self.simulate_response
    }

    /// The program source registry.
    pub fn registry(&self) -> &ProgramSourceRegistry {
        &self.registry
    }

    /// Split into the response and the registry.
    pub fn into_parts(self) -> (SimulateResponse, ProgramSourceRegistry) {
        (self.simulate_response, self.registry)
    }
}

async fn load_simulate_trace<A: FileAccessor>(
    accessor: &A,
    trace_path: &str,
) -> Result<SimulateResponse, DecodeError> {
    let raw = accessor
        .read_file(trace_path)
        .await
        .map_err(|e| {
            DecodeError::io(format!("Could not read simulate trace file '{trace_path}'"), e)
        })?;
    debug!(trace = trace_path, bytes = raw.len(), "decoding simulate trace");

    decode(&raw)
        .with_decode_context(|| format!("Could not parse simulate trace file from '{trace_path}'"))
}
