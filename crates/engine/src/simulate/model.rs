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

//! Typed model of an algod simulate response.
//!
//! Field names follow the algod REST encoding: kebab-case for response records and the
//! protocol's abbreviated names inside transactions. Binary fields are [`Blob`]s and account
//! fields are [`Address`]es, so a decoded model is independent of the wire shape it came from.

use serde::{Deserialize, Serialize};

use super::{Address, Blob};

/// The only simulate response version this crate understands.
pub const SUPPORTED_SIMULATE_RESPONSE_VERSION: u64 = 2;

/// Result of simulating a set of transaction groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateResponse {
    /// Response format version
    pub version: u64,
    /// Round the simulation ran against
    pub last_round: u64,
    /// One result per simulated group
    pub txn_groups: Vec<SimulateTransactionGroupResult>,
    /// Evaluation rules that differed from normal block evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_overrides: Option<SimulationEvalOverrides>,
    /// What the execution trace records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_trace_config: Option<SimulateTraceConfig>,
    /// Application state before the first transaction ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_states: Option<SimulateInitialStates>,
}

impl SimulateResponse {
    /// Whether the response was produced with execution tracing on.
    pub fn tracing_enabled(&self) -> bool {
        self.exec_trace_config.as_ref().is_some_and(|config| config.enable)
    }
}

/// Execution trace options of a simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateTraceConfig {
    /// Whether any trace was recorded
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable: bool,
    /// Whether stack additions and pops are recorded
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stack_change: bool,
    /// Whether scratch slot writes are recorded
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scratch_change: bool,
    /// Whether application state changes are recorded
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub state_change: bool,
}

/// Evaluation overrides requested for a simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct SimulationEvalOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_signatures: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unnamed_resources: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_log_calls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_log_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_opcode_budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_signers: Option<bool>,
}

/// Simulation result of one transaction group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateTransactionGroupResult {
    /// One result per transaction in the group
    pub txn_results: Vec<SimulateTransactionResult>,
    /// Why the group failed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    /// Path of transaction indexes (through inner transactions) to the failing transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<Vec<u64>>,
    /// Opcode budget granted to the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_budget_added: Option<u64>,
    /// Opcode budget used by the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_budget_consumed: Option<u64>,
}

/// Simulation result of one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateTransactionResult {
    /// The transaction and its effects
    pub txn_result: PendingTransactionResponse,
    /// Application opcode budget used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_budget_consumed: Option<u64>,
    /// Logic signature opcode budget used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_sig_budget_consumed: Option<u64>,
    /// Per-opcode execution trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_trace: Option<SimulationTransactionExecTrace>,
    /// Signer substituted during simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_signer: Option<Address>,
}

/// A transaction as it would appear in the pending pool, with its effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionResponse {
    /// The signed transaction
    pub txn: SignedTransaction,
    /// Pool rejection reason, empty when accepted
    #[serde(default)]
    pub pool_error: String,
    /// Round the transaction was confirmed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
    /// Id of the application created by this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_index: Option<u64>,
    /// Id of the asset created by this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<u64>,
    /// Application logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<Blob>>,
    /// Inner transactions issued by an application call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_txns: Option<Vec<PendingTransactionResponse>>,
    /// Global state changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_state_delta: Option<Vec<EvalDeltaKeyValue>>,
    /// Local state changes per account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_state_delta: Option<Vec<AccountStateDelta>>,
}

/// One state key and how it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDeltaKeyValue {
    /// Base64 state key
    pub key: String,
    /// The change
    pub value: EvalDelta,
}

/// A change to a state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDelta {
    /// 1 set bytes, 2 set uint, 3 delete
    pub action: u64,
    /// New base64 bytes value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    /// New uint value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uint: Option<u64>,
}

/// Local state changes of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateDelta {
    /// The account
    pub address: Address,
    /// Its changes
    pub delta: Vec<EvalDeltaKeyValue>,
}

/// A transaction with its signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction
    pub txn: Transaction,
    /// Ed25519 signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<Blob>,
}

/// A transaction, using the protocol's abbreviated field names on the wire.
///
/// Zero-valued fields are omitted by the protocol encoding, hence the options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Transaction {
    /// `pay`, `keyreg`, `acfg`, `axfer`, `afrz`, `appl` or `stpf`
    #[serde(rename = "type", default)]
    pub txn_type: String,
    #[serde(rename = "snd", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(rename = "fee", default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(rename = "fv", default, skip_serializing_if = "Option::is_none")]
    pub first_valid: Option<u64>,
    #[serde(rename = "lv", default, skip_serializing_if = "Option::is_none")]
    pub last_valid: Option<u64>,
    #[serde(rename = "note", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Blob>,
    #[serde(rename = "gen", default, skip_serializing_if = "Option::is_none")]
    pub genesis_id: Option<String>,
    #[serde(rename = "gh", default, skip_serializing_if = "Option::is_none")]
    pub genesis_hash: Option<Blob>,
    #[serde(rename = "grp", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Blob>,
    #[serde(rename = "lx", default, skip_serializing_if = "Option::is_none")]
    pub lease: Option<Blob>,
    #[serde(rename = "rekey", default, skip_serializing_if = "Option::is_none")]
    pub rekey_to: Option<Address>,

    // payment
    #[serde(rename = "rcv", default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Address>,
    #[serde(rename = "amt", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(rename = "close", default, skip_serializing_if = "Option::is_none")]
    pub close_remainder_to: Option<Address>,

    // asset transfer
    #[serde(rename = "xaid", default, skip_serializing_if = "Option::is_none")]
    pub xfer_asset: Option<u64>,
    #[serde(rename = "aamt", default, skip_serializing_if = "Option::is_none")]
    pub asset_amount: Option<u64>,
    #[serde(rename = "arcv", default, skip_serializing_if = "Option::is_none")]
    pub asset_receiver: Option<Address>,
    #[serde(rename = "asnd", default, skip_serializing_if = "Option::is_none")]
    pub asset_sender: Option<Address>,
    #[serde(rename = "aclose", default, skip_serializing_if = "Option::is_none")]
    pub asset_close_to: Option<Address>,

    // asset freeze
    #[serde(rename = "faid", default, skip_serializing_if = "Option::is_none")]
    pub freeze_asset: Option<u64>,
    #[serde(rename = "fadd", default, skip_serializing_if = "Option::is_none")]
    pub freeze_account: Option<Address>,
    #[serde(rename = "afrz", default, skip_serializing_if = "Option::is_none")]
    pub asset_frozen: Option<bool>,

    // asset config
    #[serde(rename = "caid", default, skip_serializing_if = "Option::is_none")]
    pub config_asset: Option<u64>,
    #[serde(rename = "apar", default, skip_serializing_if = "Option::is_none")]
    pub asset_params: Option<AssetParams>,

    // application call
    #[serde(rename = "apid", default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<u64>,
    #[serde(rename = "apan", default, skip_serializing_if = "Option::is_none")]
    pub on_completion: Option<u64>,
    #[serde(rename = "apap", default, skip_serializing_if = "Option::is_none")]
    pub approval_program: Option<Blob>,
    #[serde(rename = "apsu", default, skip_serializing_if = "Option::is_none")]
    pub clear_state_program: Option<Blob>,
    #[serde(rename = "apaa", default, skip_serializing_if = "Option::is_none")]
    pub application_args: Option<Vec<Blob>>,
    #[serde(rename = "apbx", default, skip_serializing_if = "Option::is_none")]
    pub boxes: Option<Vec<BoxReference>>,
    #[serde(rename = "apfa", default, skip_serializing_if = "Option::is_none")]
    pub foreign_apps: Option<Vec<u64>>,
    #[serde(rename = "apas", default, skip_serializing_if = "Option::is_none")]
    pub foreign_assets: Option<Vec<u64>>,
    #[serde(rename = "apep", default, skip_serializing_if = "Option::is_none")]
    pub extra_pages: Option<u64>,
}

/// Parameters of an asset being created or reconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AssetParams {
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(rename = "dc", default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u64>,
    #[serde(rename = "df", default, skip_serializing_if = "Option::is_none")]
    pub default_frozen: Option<bool>,
    #[serde(rename = "un", default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(rename = "an", default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(rename = "au", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "am", default, skip_serializing_if = "Option::is_none")]
    pub metadata_hash: Option<Blob>,
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Address>,
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Address>,
    #[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
    pub freeze: Option<Address>,
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub clawback: Option<Address>,
}

/// A box an application call may access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxReference {
    /// Index into the foreign apps array, 0 for the called app
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    /// Box name
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Blob>,
}

/// Execution trace of one transaction's programs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct SimulationTransactionExecTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_program_trace: Option<Vec<SimulationOpcodeTraceUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_program_hash: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_state_program_trace: Option<Vec<SimulationOpcodeTraceUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_state_program_hash: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_state_rollback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_state_rollback_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_sig_trace: Option<Vec<SimulationOpcodeTraceUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_sig_hash: Option<Blob>,
    /// Traces of inner transactions, in issue order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_trace: Option<Vec<SimulationTransactionExecTrace>>,
}

impl SimulationTransactionExecTrace {
    /// Every program that ran in this transaction with its hash and trace, in execution order:
    /// logic signature, then approval, then clear state.
    pub fn program_traces(&self) -> Vec<(&Blob, &[SimulationOpcodeTraceUnit])> {
        [
            (&self.logic_sig_hash, &self.logic_sig_trace),
            (&self.approval_program_hash, &self.approval_program_trace),
            (&self.clear_state_program_hash, &self.clear_state_program_trace),
        ]
        .into_iter()
        .filter_map(|(hash, trace)| Some((hash.as_ref()?, trace.as_deref()?)))
        .collect()
    }
}

/// One executed opcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationOpcodeTraceUnit {
    /// Program counter
    pub pc: u64,
    /// Indexes of inner transactions spawned by this opcode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawned_inners: Option<Vec<u64>>,
    /// Values pushed onto the stack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_additions: Option<Vec<AvmValue>>,
    /// Number of values popped from the stack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_pop_count: Option<u64>,
    /// Scratch slots written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_changes: Option<Vec<ScratchChange>>,
    /// Application state written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_changes: Option<Vec<ApplicationStateOperation>>,
}

/// A value on the AVM stack or in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvmValue {
    /// 1 for bytes, 2 for uint
    #[serde(rename = "type")]
    pub value_type: u64,
    /// Bytes value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Blob>,
    /// Uint value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uint: Option<u64>,
}

impl AvmValue {
    /// Type tag of byte values.
    pub const BYTES: u64 = 1;
    /// Type tag of uint values.
    pub const UINT: u64 = 2;

    /// Whether this is a byte value.
    pub fn is_bytes(&self) -> bool {
        self.value_type == Self::BYTES
    }
}

/// A write to a scratch slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScratchChange {
    /// Slot index
    pub slot: u64,
    /// Value written
    pub new_value: AvmValue,
}

/// A write to, or deletion of, application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationStateOperation {
    /// `w` for write, `d` for delete
    pub operation: String,
    /// `g` global, `l` local, `b` box
    pub app_state_type: String,
    /// State key
    pub key: Blob,
    /// Value written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<AvmValue>,
    /// Account owning local state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
}

/// Application state before simulation started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulateInitialStates {
    /// One entry per application touched by the simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_initial_states: Option<Vec<ApplicationInitialStates>>,
}

/// Initial state of one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct ApplicationInitialStates {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_globals: Option<ApplicationKvStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_locals: Option<Vec<ApplicationKvStorage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_boxes: Option<ApplicationKvStorage>,
}

/// A set of key-value pairs of one storage kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationKvStorage {
    /// Owner of local state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
    /// The pairs
    #[serde(default)]
    pub kvs: Vec<AvmKeyValue>,
}

/// A key with its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvmKeyValue {
    /// Key
    pub key: Blob,
    /// Value
    pub value: AvmValue,
}
