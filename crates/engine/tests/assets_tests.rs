use avmdbg_common::{FileAccessor, InMemoryFileAccessor, LocalFileAccessor};
use avmdbg_engine::{DebuggingAssets, DecodeErrorKind};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tracing::info;

const APPROVAL_HASH: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";
const CLEAR_HASH: &str = "u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7s=";

fn trace(version: u64, enable: bool) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": version,
        "last-round": 42,
        "exec-trace-config": {"enable": enable},
        "txn-groups": [{
            "txn-results": [{
                "exec-trace": {
                    "approval-program-hash": APPROVAL_HASH,
                    "approval-program-trace": [{"pc": 0}, {"pc": 1}]
                },
                "txn-result": {
                    "pool-error": "",
                    "txn": {"txn": {"type": "appl", "apid": 5}}
                }
            }]
        }]
    }))
    .unwrap()
}

fn source_map() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": 3,
        "sources": ["approval.teal"],
        "names": [],
        "mappings": "AAAA;AACA"
    }))
    .unwrap()
}

fn manifest() -> Value {
    json!({
        "txn-group-sources": [
            {"hash": APPROVAL_HASH, "sourcemap-location": "approval.teal.map"},
            {"hash": CLEAR_HASH, "sourcemap-location": null}
        ]
    })
}

fn accessor() -> InMemoryFileAccessor {
    InMemoryFileAccessor::new()
        .with_file("/debug/trace.json", trace(2, true))
        .with_file("/debug/sources.json", serde_json::to_vec(&manifest()).unwrap())
        .with_file("/debug/approval.teal.map", source_map())
}

#[tokio::test]
async fn test_load_pairs_trace_and_registry() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let accessor = accessor();
    let assets = DebuggingAssets::load(
        &accessor,
        "/debug/trace.json",
        &manifest(),
        Some("/debug/sources.json"),
    )
    .await
    .unwrap();

    assert_eq!(assets.simulate_response().last_round, 42);

    // Resolve the executing program back to its source, as a stepping runtime would.
    let exec_trace =
        assets.simulate_response().txn_groups[0].txn_results[0].exec_trace.as_ref().unwrap();
    let (hash, units) = exec_trace.program_traces()[0];
    let descriptor = assets.registry().find_by_hash(hash).unwrap();
    assert_eq!(descriptor.full_source_path(0), Some("/debug/approval.teal"));
    let location = descriptor.sourcemap().location_for_pc(units[1].pc).unwrap();
    assert_eq!(location.line, 1);

    assert!(assets.registry().find_by_hash(&STANDARD.decode(CLEAR_HASH).unwrap()).is_none());
}

#[tokio::test]
async fn test_load_from_files() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let accessor = accessor();
    let assets =
        DebuggingAssets::load_from_files(&accessor, "/debug/trace.json", "/debug/sources.json")
            .await
            .unwrap();

    assert_eq!(assets.registry().len(), 1);
    let mut reads = accessor.reads();
    reads.sort();
    assert_eq!(
        reads,
        vec!["/debug/approval.teal.map", "/debug/sources.json", "/debug/trace.json"]
    );
}

#[tokio::test]
async fn test_trace_failures_name_the_trace_file() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let accessor = accessor();
    accessor.insert("/debug/v1.json", trace(1, true));
    accessor.insert("/debug/untraced.json", trace(2, false));
    accessor.insert("/debug/garbage.json", b"\xff\xfe".to_vec());

    let cases = [
        ("/debug/v1.json", DecodeErrorKind::UnsupportedVersion),
        ("/debug/untraced.json", DecodeErrorKind::TracingNotEnabled),
        ("/debug/garbage.json", DecodeErrorKind::MalformedInput),
    ];
    for (path, kind) in cases {
        let err = DebuggingAssets::load(&accessor, path, &manifest(), Some("/debug/sources.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kind);
        let prefix = format!("Could not parse simulate trace file from '{path}': ");
        assert!(err.to_string().starts_with(&prefix));
    }

    let err = DebuggingAssets::load(&accessor, "/debug/nope.json", &manifest(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
    assert!(err.to_string().starts_with("Could not read simulate trace file '/debug/nope.json': "));
}

#[tokio::test]
async fn test_registry_failure_fails_whole_load() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let accessor = InMemoryFileAccessor::new().with_file("/debug/trace.json", trace(2, true));
    let err = DebuggingAssets::load(
        &accessor,
        "/debug/trace.json",
        &manifest(),
        Some("/debug/sources.json"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
}

#[tokio::test]
async fn test_invalid_manifest_reads_nothing() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let accessor = accessor();
    let err = DebuggingAssets::load(
        &accessor,
        "/debug/trace.json",
        &json!({"txn-group-sources": "approval.teal.map"}),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::ManifestShapeInvalid);
    assert!(err.to_string().starts_with("Could not parse program sources description content"));
    assert!(accessor.reads().is_empty());
}

#[tokio::test]
async fn test_load_from_local_files() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap().to_string();
    let accessor = LocalFileAccessor::with_case_insensitivity(false);

    let trace_path = format!("{root}/trace.json");
    let manifest_path = format!("{root}/sources.json");
    accessor.write_file(&trace_path, &trace(2, true)).await.unwrap();
    let manifest_bytes = serde_json::to_vec(&manifest()).unwrap();
    accessor.write_file(&manifest_path, &manifest_bytes).await.unwrap();
    accessor.write_file(&format!("{root}/approval.teal.map"), &source_map()).await.unwrap();

    let assets = DebuggingAssets::load_from_files(&accessor, &trace_path, &manifest_path)
        .await
        .unwrap();
    let descriptor =
        assets.registry().find_by_hash(&STANDARD.decode(APPROVAL_HASH).unwrap()).unwrap();
    assert_eq!(descriptor.full_source_path(0), Some(format!("{root}/approval.teal").as_str()));
}

#[tokio::test]
async fn test_local_read_failures_name_the_file() {
    avmdbg_common::logging::ensure_test_logging(None);
    info!("Running test");

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap().to_string();
    let accessor = LocalFileAccessor::with_case_insensitivity(false);
    let trace_path = format!("{root}/trace.json");
    let manifest_path = format!("{root}/sources.json");

    // Missing trace file.
    let err = DebuggingAssets::load(&accessor, &trace_path, &manifest(), Some(&manifest_path))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
    assert!(err
        .to_string()
        .starts_with(&format!("Could not read simulate trace file '{trace_path}': ")));

    // Missing manifest file.
    accessor.write_file(&trace_path, &trace(2, true)).await.unwrap();
    let err = DebuggingAssets::load_from_files(&accessor, &trace_path, &manifest_path)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
    assert!(err.to_string().starts_with(&format!(
        "Could not read program sources description file '{manifest_path}': "
    )));

    // Manifest present, source map missing.
    let manifest_bytes = serde_json::to_vec(&manifest()).unwrap();
    accessor.write_file(&manifest_path, &manifest_bytes).await.unwrap();
    let err = DebuggingAssets::load_from_files(&accessor, &trace_path, &manifest_path)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::IoFailure);
    assert!(err
        .to_string()
        .starts_with(&format!("Could not read source map file '{root}/approval.teal.map': ")));
}
