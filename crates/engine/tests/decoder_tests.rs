use avmdbg_engine::{
    decode, decode_simulate_response, Address, AvmValue, Blob, DecodeErrorKind, DecodeOutcome,
};
use serde_json::{json, Value};
use tracing::info;

const SENDER_TEXT: &str = "AAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYP7MUPJQE";
const SENDER_KEY_B64: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
const ZERO_KEY_B64: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
const ZERO_ADDRESS_TEXT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";
const GENESIS_HASH_B64: &str = "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=";
const PROGRAM_HASH_B64: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

/// An app call simulate response with the sender written as `sender`.
fn app_call_response(sender: &str) -> Value {
    json!({
        "version": 2,
        "last-round": 1234,
        "exec-trace-config": {"enable": true, "stack-change": true},
        "txn-groups": [{
            "app-budget-added": 700,
            "app-budget-consumed": 9,
            "txn-results": [{
                "app-budget-consumed": 9,
                "exec-trace": {
                    "approval-program-hash": PROGRAM_HASH_B64,
                    "approval-program-trace": [
                        {"pc": 1},
                        {"pc": 4, "stack-additions": [{"type": 1, "bytes": "aGVsbG8="}]},
                        {"pc": 5, "stack-additions": [{"type": 2, "uint": 1}], "stack-pop-count": 1}
                    ]
                },
                "txn-result": {
                    "pool-error": "",
                    "logs": ["aGVsbG8="],
                    "txn": {
                        "sig": "AQIDBA==",
                        "txn": {
                            "type": "appl",
                            "snd": sender,
                            "fee": 1000,
                            "fv": 10,
                            "lv": 1010,
                            "gen": "testnet-v1.0",
                            "gh": GENESIS_HASH_B64,
                            "note": "bm90ZQ==",
                            "apid": 1001,
                            "apaa": ["AQ==", "AAAAAAAAAAI="],
                            "apbx": [{"i": 0, "n": "Ym94"}],
                            "apfa": [7, 8]
                        }
                    }
                }
            }]
        }]
    })
}

fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[test]
fn test_canonical_and_legacy_encodings_decode_identically() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let canonical = decode_simulate_response(&bytes(&app_call_response(SENDER_TEXT)));
    let legacy = decode_simulate_response(&bytes(&app_call_response(SENDER_KEY_B64)));

    let DecodeOutcome::Canonical(canonical) = canonical else {
        panic!("expected canonical decode, got {canonical:?}");
    };
    let DecodeOutcome::Legacy(legacy) = legacy else {
        panic!("expected legacy decode, got {legacy:?}");
    };
    assert_eq!(canonical, legacy);

    let txn = &legacy.txn_groups[0].txn_results[0].txn_result.txn.txn;
    assert_eq!(txn.sender.unwrap().to_string(), SENDER_TEXT);
    assert_eq!(
        txn.application_args.as_deref(),
        Some(&[Blob(vec![1]), Blob(vec![0, 0, 0, 0, 0, 0, 0, 2])][..])
    );
    assert_eq!(txn.boxes.as_ref().unwrap()[0].name.as_deref(), Some(&b"box"[..]));
    assert_eq!(txn.note.as_deref(), Some(&b"note"[..]));
    assert_eq!(txn.genesis_hash.as_ref().unwrap().len(), 32);
}

#[test]
fn test_decoded_trace_is_queryable() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let response = decode(&bytes(&app_call_response(SENDER_TEXT))).unwrap();
    assert_eq!(response.last_round, 1234);

    let result = &response.txn_groups[0].txn_results[0];
    assert_eq!(result.txn_result.logs.as_deref(), Some(&[Blob(b"hello".to_vec())][..]));

    let trace = result.exec_trace.as_ref().unwrap();
    let programs = trace.program_traces();
    assert_eq!(programs.len(), 1);
    let (hash, units) = programs[0];
    assert_eq!(hash.to_base64(), PROGRAM_HASH_B64);
    assert_eq!(units.iter().map(|unit| unit.pc).collect::<Vec<_>>(), vec![1, 4, 5]);

    let pushed = &units[1].stack_additions.as_ref().unwrap()[0];
    assert!(pushed.is_bytes());
    assert_eq!(pushed.bytes.as_deref(), Some(&b"hello"[..]));
    let pushed = &units[2].stack_additions.as_ref().unwrap()[0];
    assert_eq!(pushed.value_type, AvmValue::UINT);
    assert_eq!(pushed.uint, Some(1));
}

#[test]
fn test_legacy_zero_key_receiver_becomes_zero_address() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let document = json!({
        "version": 2,
        "last-round": 1,
        "exec-trace-config": {"enable": true},
        "txn-groups": [{
            "txn-results": [{
                "txn-result": {
                    "pool-error": "",
                    "txn": {"txn": {
                        "type": "pay",
                        "snd": SENDER_KEY_B64,
                        "rcv": ZERO_KEY_B64,
                        "amt": 5
                    }}
                }
            }]
        }]
    });

    let outcome = decode_simulate_response(&bytes(&document));
    assert!(outcome.is_legacy());
    let response = outcome.into_result().unwrap();

    let txn = &response.txn_groups[0].txn_results[0].txn_result.txn.txn;
    assert_eq!(txn.receiver, Some(Address::ZERO));
    assert_eq!(txn.receiver.unwrap().to_string(), ZERO_ADDRESS_TEXT);
    assert_eq!(txn.amount, Some(5));
}

#[test]
fn test_unsupported_version_on_both_encodings() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    for sender in [SENDER_TEXT, SENDER_KEY_B64] {
        let mut document = app_call_response(sender);
        document["version"] = json!(1);

        let err = decode(&bytes(&document)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedVersion);
        assert_eq!(err.to_string(), "Unsupported simulate response version: 1");
    }
}

#[test]
fn test_tracing_not_enabled_on_both_encodings() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    for sender in [SENDER_TEXT, SENDER_KEY_B64] {
        let mut document = app_call_response(sender);
        document["exec-trace-config"] = json!({"enable": false});
        let err = decode(&bytes(&document)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TracingNotEnabled);
        assert_eq!(
            err.to_string(),
            "Simulate response does not contain trace data. execTraceConfig={}"
        );

        document.as_object_mut().unwrap().remove("exec-trace-config");
        let err = decode(&bytes(&document)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TracingNotEnabled);
        assert!(err.to_string().ends_with("execTraceConfig=undefined"));
    }
}

#[test]
fn test_legacy_invalid_binary_field_is_malformed() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let mut document = app_call_response(SENDER_KEY_B64);
    document["txn-groups"][0]["txn-results"][0]["txn-result"]["txn"]["txn"]["gh"] = json!("%%%");

    match decode_simulate_response(&bytes(&document)) {
        DecodeOutcome::Failed(err) => {
            assert_eq!(err.kind(), DecodeErrorKind::MalformedInput);
            assert!(err.to_string().contains("'gh'"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
