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

//! Simulate response decoding.
//!
//! A trace file holds either the canonical JSON encoding of a [`SimulateResponse`] or the
//! legacy shape handled by [`super::legacy`]. [`decode_simulate_response`] tries both and says
//! which one matched. [`decode`] adds the checks that make a response usable for debugging.

use avmdbg_common::utf8_decode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    legacy::rewrite_legacy_document, EncodedValue, SimulateResponse,
    SUPPORTED_SIMULATE_RESPONSE_VERSION,
};
use crate::DecodeError;

/// Which wire encoding a simulate response was decoded from.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// Decoded directly as canonical JSON
    Canonical(SimulateResponse),
    /// Decoded through the legacy rewrite
    Legacy(SimulateResponse),
    /// Neither encoding matched
    Failed(DecodeError),
}

impl DecodeOutcome {
    /// The decoded response, whichever encoding it came from.
    pub fn into_result(self) -> Result<SimulateResponse, DecodeError> {
        match self {
            Self::Canonical(response) | Self::Legacy(response) => Ok(response),
            Self::Failed(err) => Err(err),
        }
    }

    /// Whether the legacy path produced the response.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// Decode canonical JSON.
pub fn decode_canonical(text: &str) -> Result<SimulateResponse, DecodeError> {
    serde_json::from_str(text).map_err(|e| DecodeError::malformed(e.to_string()))
}

/// Decode the legacy shape: rewrite binary and address fields, check the declared version, then
/// decode the typed model from the rewritten tree.
pub fn decode_legacy(text: &str) -> Result<SimulateResponse, DecodeError> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeError::malformed(e.to_string()))?;
    let rewritten = rewrite_legacy_document(document)?;

    if let Some(version) = rewritten.get("version") {
        let supported = matches!(
            version,
            EncodedValue::Number(n) if n.as_u64() == Some(SUPPORTED_SIMULATE_RESPONSE_VERSION)
        );
        if !supported {
            return Err(DecodeError::UnsupportedVersion(version_text(version)));
        }
    }

    SimulateResponse::deserialize(rewritten).map_err(|e| DecodeError::malformed(e.to_string()))
}

fn version_text(version: &EncodedValue) -> String {
    match version {
        EncodedValue::Number(n) => n.to_string(),
        EncodedValue::Text(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

/// Decode raw trace bytes, trying the canonical encoding first and the legacy one second.
///
/// No usability checks are applied; see [`decode`].
pub fn decode_simulate_response(raw: &[u8]) -> DecodeOutcome {
    let Some(text) = utf8_decode(raw) else {
        return DecodeOutcome::Failed(DecodeError::malformed("Simulate trace is not valid UTF-8"));
    };

    let canonical_err = match decode_canonical(&text) {
        Ok(response) => return DecodeOutcome::Canonical(response),
        Err(err) => err,
    };
    debug!(error = %canonical_err, "canonical decode failed, trying legacy simulate response");

    match decode_legacy(&text) {
        Ok(response) => {
            warn!("simulate response uses the legacy encoding");
            DecodeOutcome::Legacy(response)
        }
        Err(err) => DecodeOutcome::Failed(err),
    }
}

/// Check that a response can drive a debugger: supported version and tracing enabled.
pub fn validate_simulate_response(response: &SimulateResponse) -> Result<(), DecodeError> {
    if response.version != SUPPORTED_SIMULATE_RESPONSE_VERSION {
        return Err(DecodeError::UnsupportedVersion(response.version.to_string()));
    }
    if !response.tracing_enabled() {
        let config = match &response.exec_trace_config {
            Some(config) => serde_json::to_string(config)
                .map_err(|e| DecodeError::malformed(e.to_string()))?,
            None => "undefined".to_string(),
        };
        return Err(DecodeError::TracingNotEnabled(config));
    }
    Ok(())
}

/// Decode and validate a simulate response.
pub fn decode(raw: &[u8]) -> Result<SimulateResponse, DecodeError> {
    let response = decode_simulate_response(raw).into_result()?;
    validate_simulate_response(&response)?;
    Ok(response)
}
