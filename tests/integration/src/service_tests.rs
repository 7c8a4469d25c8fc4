//! Debug service over snapshot-backed domains
//!
//! Builds the router the way `mirror-debug serve` does and drives it with
//! line-delimited JSON-RPC.

#![cfg(any(debug_assertions, feature = "debug-service"))]

use mirror_audit::AuditConfig;
use mirror_debug::{DebugServer, DomainSpec, Error, ServiceRouter};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::io::Cursor;
use std::path::PathBuf;

fn spec(name: &str, file: &str) -> DomainSpec {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/snapshots")
        .join(file);
    format!("{name}={}", path.display()).parse().unwrap()
}

fn server() -> DebugServer {
    let router = ServiceRouter::from_specs(
        &[
            spec("docs", "docs-domain.json"),
            spec("plain", "parent-mismatch.toml"),
        ],
        &AuditConfig::default(),
    )
    .unwrap();
    DebugServer::new(router)
}

async fn exchange(server: &DebugServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{r}\n")).collect();
    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_session_over_stdio() {
    let responses = exchange(
        &server(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "domains/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "validate",
                   "params": {"identifier": "docs:root"}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "validate",
                   "params": {"identifier": "A", "domain": "plain"}}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "validate",
                   "params": {"identifier": "A"}}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["result"], json!(["docs", "plain"]));

    let docs = &responses[1]["result"];
    assert_eq!(docs["summary"]["errors"], 2);

    let plain = &responses[2]["result"];
    assert_eq!(plain["findings"][0]["rule"], "ParentMismatch");
    assert_eq!(plain["findings"][0]["related"], json!(["B", "C"]));

    // Two domains: no default service for unprefixed identifiers
    assert_eq!(responses[3]["error"]["code"], -32002);
}

#[tokio::test]
async fn test_sessions_are_numbered_in_order() {
    let responses = exchange(
        &server(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "validate",
                   "params": {"identifier": "docs:root"}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "validate",
                   "params": {"identifier": "docs:root"}}),
        ],
    )
    .await;

    let first = responses[0]["result"]["session"]["sequence"].as_u64().unwrap();
    let second = responses[1]["result"]["session"]["sequence"].as_u64().unwrap();
    assert!(second > first);
    assert_eq!(
        responses[0]["result"]["findings"],
        responses[1]["result"]["findings"]
    );
}

#[test]
fn test_duplicate_domain_specs_are_rejected() {
    let result = ServiceRouter::from_specs(
        &[
            spec("docs", "docs-domain.json"),
            spec("docs", "name-collision.json"),
        ],
        &AuditConfig::default(),
    );
    assert!(matches!(result, Err(Error::DuplicateDomain { .. })));
}

#[test]
fn test_unreadable_snapshot_fails_setup() {
    let result = ServiceRouter::from_specs(
        &[spec("docs", "missing.json")],
        &AuditConfig::default(),
    );
    assert!(matches!(result, Err(Error::Store(_))));
}
