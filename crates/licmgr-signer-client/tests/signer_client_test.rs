//! # HTTP Signer Client Tests
//!
//! Runs `SignerClient` against a wiremock server standing in for the
//! hardware signer: request shape, reply parsing, and error mapping.

use licmgr_core::CanonicalBytes;
use licmgr_crypto::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey};
use std::time::Duration;

use licmgr_signer_client::{DocumentSigner, RetryPolicy, SignerClient, SignerConfig, SignerError};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SignerClient {
    let mut config = SignerConfig::new(&server.uri()).expect("config");
    config.timeout_secs = 5;
    SignerClient::new(config).expect("client")
}

fn summary_bytes() -> CanonicalBytes {
    CanonicalBytes::new(&serde_json::json!({
        "date": "2026-01-15",
        "generated_at": "2026-01-15T00:00:00Z",
        "clients": {}
    }))
    .unwrap()
}

#[tokio::test]
async fn sign_posts_canonical_bytes_and_decodes_signature() {
    let server = MockServer::start().await;
    let kp = Ed25519KeyPair::from_seed(&[5u8; 32]);
    let doc = summary_bytes();
    let sig = kp.sign(&doc);

    Mock::given(method("POST"))
        .and(path("/sign"))
        .and(header("content-type", "application/json"))
        .and(body_bytes(doc.as_bytes().to_vec()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "signature": sig.to_base64() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let got = client(&server).sign(&doc).await.expect("sign");
    assert_eq!(got, sig);
    verify_with_public_key(&doc, &got, &kp.public_key()).expect("verifies");
}

#[tokio::test]
async fn non_2xx_is_rejected_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sign"))
        .respond_with(ResponseTemplate::new(400).set_body_string("hw_lock_not_found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).sign(&summary_bytes()).await.unwrap_err();
    assert_eq!(
        err,
        SignerError::Rejected {
            status: 400,
            body: "hw_lock_not_found".into()
        }
    );
}

#[tokio::test]
async fn garbage_signature_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sign"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "signature": "nope" })),
        )
        .mount(&server)
        .await;

    let err = client(&server).sign(&summary_bytes()).await.unwrap_err();
    assert!(matches!(err, SignerError::Protocol(_)));
}

#[tokio::test]
async fn missing_signature_field_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = client(&server).sign(&summary_bytes()).await.unwrap_err();
    assert!(matches!(err, SignerError::Protocol(_)));
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let mut config = SignerConfig::new("http://127.0.0.1:1").unwrap();
    config.timeout_secs = 1;
    config.retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::from_millis(5),
    };
    let err = SignerClient::new(config)
        .unwrap()
        .sign(&summary_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::Unreachable { .. }));
}

#[tokio::test]
async fn info_reports_public_key() {
    let server = MockServer::start().await;
    let pk = Ed25519KeyPair::from_seed(&[9u8; 32]).public_key();
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "present": true,
            "device_id": "HW-DEV-001",
            "public_key": pk.to_base64()
        })))
        .mount(&server)
        .await;

    let info = client(&server).info().await.expect("info");
    assert!(info.present);
    assert_eq!(info.device_id.as_deref(), Some("HW-DEV-001"));
    assert_eq!(info.public_key, Some(pk));
}

#[tokio::test]
async fn public_key_comes_from_config() {
    let server = MockServer::start().await;
    let pk: Ed25519PublicKey = Ed25519KeyPair::generate().public_key();
    let c = client(&server);
    assert_eq!(c.public_key(), None);
    assert_eq!(c.with_public_key(pk).public_key(), Some(pk));
}

#[derive(Clone, Default)]
struct LogBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Answers every connection with a 500 whose body is cut short.
async fn truncated_error_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let _ = sock
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\npartial")
                .await;
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unreadable_error_body_is_logged_and_still_rejected() {
    let logs = LogBuf::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut config = SignerConfig::new(&truncated_error_server().await).expect("config");
    config.timeout_secs = 5;
    let err = SignerClient::new(config).expect("client").info().await.unwrap_err();

    assert!(matches!(err, SignerError::Rejected { status: 500, ref body } if body.is_empty()));
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("could not read signer error body"), "{text}");
}
