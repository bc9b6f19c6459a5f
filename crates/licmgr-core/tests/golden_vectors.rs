//! # Golden Byte Sequences for the Canonical Encoder
//!
//! The manager, the signer emulator and the offline verifier must produce the
//! same bytes for the same logical value. These vectors pin the exact output
//! (and its SHA-256) for the two payload shapes that get signed in practice,
//! plus the key-ordering and escaping corners where encoders usually diverge.

use licmgr_core::{sha256_digest, CanonicalBytes};
use serde_json::json;

fn canonical_str(v: &serde_json::Value) -> String {
    let cb = CanonicalBytes::new(v).expect("canonicalization should succeed");
    String::from_utf8(cb.into_vec()).expect("canonical bytes are UTF-8")
}

fn digest_hex(v: &serde_json::Value) -> String {
    let cb = CanonicalBytes::new(v).expect("canonicalization should succeed");
    sha256_digest(&cb).to_hex()
}

// ---------------------------------------------------------------------------
// Usage report payload (signature field already removed)
// ---------------------------------------------------------------------------

#[test]
fn golden_usage_report_payload() {
    let payload = json!({
        "client_id": "dev1",
        "license_id": "LIC-20260115120000",
        "timestamp": "2026-01-15T12:00:00Z",
        "usage_bytes_since_last": 1024,
        "total_usage_bytes": 52428800
    });

    assert_eq!(
        canonical_str(&payload),
        r#"{"client_id":"dev1","license_id":"LIC-20260115120000","timestamp":"2026-01-15T12:00:00Z","total_usage_bytes":52428800,"usage_bytes_since_last":1024}"#
    );
    assert_eq!(
        digest_hex(&payload),
        "763c5c6170fdcf9f5932b16ebf5f3e126c0a939ecc36a68f905b7d976c8aa3cc"
    );
}

// ---------------------------------------------------------------------------
// Summary snapshot
// ---------------------------------------------------------------------------

#[test]
fn golden_summary_snapshot() {
    let summary = json!({
        "date": "2026-01-15",
        "generated_at": "2026-01-15T00:00:00Z",
        "clients": {
            "dev1": {
                "license_id": "LIC-20260101000000",
                "total_usage_bytes": 52428800,
                "quota_bytes": 104857600,
                "revoked": false,
                "issued_at": "2026-01-01T00:00:00Z",
                "expires_at": "2026-01-31T00:00:00Z"
            }
        }
    });

    assert_eq!(
        canonical_str(&summary),
        r#"{"clients":{"dev1":{"expires_at":"2026-01-31T00:00:00Z","issued_at":"2026-01-01T00:00:00Z","license_id":"LIC-20260101000000","quota_bytes":104857600,"revoked":false,"total_usage_bytes":52428800}},"date":"2026-01-15","generated_at":"2026-01-15T00:00:00Z"}"#
    );
    assert_eq!(
        digest_hex(&summary),
        "61205ea5f9444d9ad6a5ffe81cb1c14d102f92c1774c085f0be9ea100a37973d"
    );
}

#[test]
fn golden_summary_is_independent_of_pretty_printing() {
    let pretty = r#"{
        "generated_at": "2026-01-15T00:00:00Z",
        "date": "2026-01-15",
        "clients": {
            "dev1": {
                "revoked": false,
                "quota_bytes": 104857600,
                "total_usage_bytes": 52428800,
                "license_id": "LIC-20260101000000",
                "expires_at": "2026-01-31T00:00:00Z",
                "issued_at": "2026-01-01T00:00:00Z"
            }
        }
    }"#;
    let cb = CanonicalBytes::parse(pretty.as_bytes()).unwrap();
    assert_eq!(
        sha256_digest(&cb).to_hex(),
        "61205ea5f9444d9ad6a5ffe81cb1c14d102f92c1774c085f0be9ea100a37973d"
    );
}

// ---------------------------------------------------------------------------
// Key order is by code point, not UTF-16 code unit
// ---------------------------------------------------------------------------

#[test]
fn golden_non_ascii_key_order() {
    // U+FF5E sorts before U+1F600 by code point; a UTF-16 ordering would
    // place the surrogate pair (0xD83D...) first.
    let v = json!({"é": 1, "z": 2, "Ä": 3, "\u{1F600}": 4, "\u{FF5E}": 5});
    assert_eq!(canonical_str(&v), "{\"z\":2,\"Ä\":3,\"é\":1,\"～\":5,\"😀\":4}");
    assert_eq!(
        digest_hex(&v),
        "6ac3bc574deed0d4b5fcea1bf0e29aaaf7b4d9629acb900af6def25d38cce98a"
    );
}

#[test]
fn golden_string_escapes() {
    let v = json!({"s": "a\"b\\c\n\t\u{0001}/\u{007f}"});
    assert_eq!(canonical_str(&v), "{\"s\":\"a\\\"b\\\\c\\n\\t\\u0001/\u{7f}\"}");
    assert_eq!(
        digest_hex(&v),
        "724b3e670e96ccbf74bbaedc739e836a6a63c15ef04f17ee9a55924b2b6d86b8"
    );
}

#[test]
fn golden_empty_object() {
    assert_eq!(canonical_str(&json!({})), "{}");
    assert_eq!(
        digest_hex(&json!({})),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}
