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

//! Program source maps.
//!
//! A source map is a version 3 JSON source map whose `mappings` carry one `;`-separated group
//! per program counter. Maps emitted by higher-level compilers additionally carry `pc_events`,
//! a table of symbolic debug information per program counter; such maps are called enriched.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// The only source map format version understood.
pub const SUPPORTED_SOURCE_MAP_VERSION: u64 = 3;

/// Extension of low-level TEAL sources.
pub const TEAL_SOURCE_EXTENSION: &str = ".teal";

/// Symbolic debug information attached to one program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcEvent {
    /// Enclosing subroutine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subroutine: Option<String>,
    /// Enclosing block label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Opcode mnemonic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Target of a `callsub`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsub: Option<String>,
    /// Set on `retsub`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retsub: Option<bool>,
    /// Named subroutine parameters and their types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
    /// Symbolic stack entries consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_in: Option<Vec<String>>,
    /// Symbolic stack entries produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_out: Option<Vec<String>>,
    /// Variables defined by the produced entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_out: Option<Vec<String>>,
}

/// Source map file contents, as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Format version
    pub version: u64,
    /// Source paths, relative to the source map file
    pub sources: Vec<String>,
    /// Symbol names
    #[serde(default)]
    pub names: Vec<String>,
    /// Base64 VLQ position table
    pub mappings: String,
    /// Offset of the first opcode in the program
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_pc_offset: Option<u64>,
    /// Per program counter debug events, keyed by the decimal pc
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc_events: Option<BTreeMap<String, PcEvent>>,
}

/// Whether a source map carries the per-pc event table.
pub fn is_enriched_source_map(source_map: Option<&SourceMap>) -> bool {
    source_map.is_some_and(|map| map.pc_events.is_some())
}

/// Whether a source path belongs to a higher-level frontend language rather than TEAL.
///
/// A missing path counts as frontend.
pub fn is_frontend_source_path(path: Option<&str>) -> bool {
    !path.is_some_and(|path| path.ends_with(TEAL_SOURCE_EXTENSION))
}

/// A position in one of the map's sources. Lines and columns are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Index into [`SourceMap::sources`]
    pub source_index: usize,
    /// Zero-based line
    pub line: u64,
    /// Zero-based column
    pub column: u64,
}

/// A validated source map with its position table decoded.
#[derive(Debug, Clone)]
pub struct ProgramSourceMap {
    raw: SourceMap,
    pc_locations: BTreeMap<u64, SourceLocation>,
    line_pcs: HashMap<(usize, u64), Vec<u64>>,
    pc_events: BTreeMap<u64, PcEvent>,
}

impl ProgramSourceMap {
    /// Parse source map JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: SourceMap =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::malformed(e.to_string()))?;
        Self::new(raw)
    }

    /// Validate a source map and decode its position and event tables.
    pub fn new(raw: SourceMap) -> Result<Self, DecodeError> {
        if raw.version != SUPPORTED_SOURCE_MAP_VERSION {
            return Err(DecodeError::malformed(format!(
                "Only source map version {SUPPORTED_SOURCE_MAP_VERSION} is supported, got {}",
                raw.version
            )));
        }

        let pc_locations = decode_mappings(&raw.mappings, raw.sources.len())?;
        let mut line_pcs: HashMap<(usize, u64), Vec<u64>> = HashMap::new();
        for (pc, location) in &pc_locations {
            line_pcs.entry((location.source_index, location.line)).or_default().push(*pc);
        }

        let mut pc_events = BTreeMap::new();
        for (key, event) in raw.pc_events.iter().flatten() {
            let pc = key
                .parse::<u64>()
                .map_err(|_| DecodeError::malformed(format!("invalid pc_events key '{key}'")))?;
            pc_events.insert(pc, event.clone());
        }

        Ok(Self { raw, pc_locations, line_pcs, pc_events })
    }

    /// The file contents this map was built from.
    pub fn source_map(&self) -> &SourceMap {
        &self.raw
    }

    /// Declared source paths, relative to the map file.
    pub fn sources(&self) -> &[String] {
        &self.raw.sources
    }

    /// Declared symbol names.
    pub fn names(&self) -> &[String] {
        &self.raw.names
    }

    /// The raw position table.
    pub fn mappings(&self) -> &str {
        &self.raw.mappings
    }

    /// Offset of the first opcode, zero when not declared.
    pub fn op_pc_offset(&self) -> u64 {
        self.raw.op_pc_offset.unwrap_or_default()
    }

    /// Whether the map carries the per-pc event table.
    pub fn is_enriched(&self) -> bool {
        is_enriched_source_map(Some(&self.raw))
    }

    /// Source position of the opcode at `pc`.
    pub fn location_for_pc(&self, pc: u64) -> Option<&SourceLocation> {
        self.pc_locations.get(&pc)
    }

    /// Every mapped program counter, ascending.
    pub fn pcs(&self) -> impl Iterator<Item = u64> + '_ {
        self.pc_locations.keys().copied()
    }

    /// Program counters mapped to a line of a source, ascending.
    pub fn pcs_on_source_line(&self, source_index: usize, line: u64) -> &[u64] {
        self.line_pcs.get(&(source_index, line)).map(Vec::as_slice).unwrap_or_default()
    }

    /// Debug event at `pc`, for enriched maps.
    pub fn pc_event(&self, pc: u64) -> Option<&PcEvent> {
        self.pc_events.get(&pc)
    }
}

fn decode_mappings(
    mappings: &str,
    source_count: usize,
) -> Result<BTreeMap<u64, SourceLocation>, DecodeError> {
    let mut locations = BTreeMap::new();
    let (mut source_index, mut line, mut column) = (0i64, 0i64, 0i64);

    for (pc, group) in mappings.split(';').enumerate() {
        // Only the first segment of a group positions the opcode.
        let segment = group.split(',').next().unwrap_or_default();
        let fields = decode_vlq(segment)
            .map_err(|e| DecodeError::malformed(format!("invalid mappings at pc {pc}: {e}")))?;
        let [_, source_delta, line_delta, column_delta, ..] = fields[..] else {
            continue;
        };

        let advanced = (
            source_index.checked_add(source_delta),
            line.checked_add(line_delta),
            column.checked_add(column_delta),
        );
        let (Some(next_source), Some(next_line), Some(next_column)) = advanced else {
            return Err(DecodeError::malformed(format!("mappings overflow at pc {pc}")));
        };
        (source_index, line, column) = (next_source, next_line, next_column);

        let position =
            (usize::try_from(source_index), u64::try_from(line), u64::try_from(column));
        let (Ok(index), Ok(line), Ok(column)) = position else {
            return Err(DecodeError::malformed(format!("negative position in mappings at pc {pc}")));
        };
        if index >= source_count {
            return Err(DecodeError::malformed(format!(
                "mappings at pc {pc} point outside the declared sources"
            )));
        }
        locations.insert(pc as u64, SourceLocation { source_index: index, line, column });
    }

    Ok(locations)
}

fn vlq_digit(c: u8) -> Option<i64> {
    let value = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(value.into())
}

/// Decode one base64 VLQ segment into signed integers.
fn decode_vlq(segment: &str) -> Result<Vec<i64>, String> {
    let mut values = Vec::new();
    let (mut value, mut shift) = (0i64, 0u32);

    for c in segment.bytes() {
        let digit = vlq_digit(c).ok_or_else(|| format!("unexpected character '{}'", c as char))?;
        // Keeps the accumulated value below 2^60.
        if shift > 55 {
            return Err("value overflows".to_string());
        }
        value += (digit & 0b1_1111) << shift;

        if digit & 0b10_0000 != 0 {
            shift += 5;
        } else {
            let magnitude = value >> 1;
            values.push(if value & 1 == 1 { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
        }
    }

    if shift != 0 {
        return Err("unterminated value".to_string());
    }
    Ok(values)
}
