//! Integration test for the HTTP probe against a hand-rolled mock server,
//! in the same raw-socket style the FTP/TFTP probes use internally (no
//! HTTP-mocking crate exists in this corpus's dependency stack).
//!
//! Checks that a 200 response whose body contains the configured pattern
//! classifies as `vulnerable` with a matching excerpt.

use std::time::Duration;

use dotpath_fuzz::classify;
use dotpath_fuzz::probes::http::HttpProbe;
use dotpath_fuzz::types::{Payload, ProtocolModule};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn spawn_mock_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await;

        let response = format!(
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn vulnerable_response_classifies_with_matched_excerpt() {
    let endpoint = spawn_mock_server(
        "HTTP/1.1 200 OK",
        "root:x:0:0:root:/root:/bin/bash\n",
    )
    .await;

    let probe = HttpProbe::new(endpoint, "GET".to_string(), false, vec!["dotpath-fuzz/test".to_string()]);
    let payload = Payload::from_string("../../../etc/passwd");

    let outcome = probe.probe(&payload, Duration::from_secs(2)).await;
    assert_eq!(outcome.status, Some(200));

    let result = classify(&outcome, Some("root:"), ProtocolModule::Http, false);
    assert_eq!(result.classification, dotpath_fuzz::Classification::Vulnerable);
    let (start, end) = result.matched_range.expect("pattern match should carry a byte range");
    assert_eq!(&outcome.body_preview[start..end], b"root:");
    let excerpt = dotpath_fuzz::excerpt(&outcome.body_preview, (start, end));
    assert!(excerpt.contains("root:"));
}

#[tokio::test]
async fn non_matching_pattern_is_a_false_positive() {
    let endpoint = spawn_mock_server("HTTP/1.1 200 OK", "<html>nothing here</html>").await;

    let probe = HttpProbe::new(endpoint, "GET".to_string(), false, vec![]);
    let payload = Payload::from_string("../../../etc/passwd");

    let outcome = probe.probe(&payload, Duration::from_secs(2)).await;
    let result = classify(&outcome, Some("root:"), ProtocolModule::Http, false);
    assert_eq!(result.classification, dotpath_fuzz::Classification::FalsePositive);
}

#[tokio::test]
async fn not_found_is_a_false_positive() {
    let endpoint = spawn_mock_server("HTTP/1.1 404 Not Found", "nope").await;

    let probe = HttpProbe::new(endpoint, "GET".to_string(), false, vec![]);
    let payload = Payload::from_string("../../../etc/passwd");

    let outcome = probe.probe(&payload, Duration::from_secs(2)).await;
    let result = classify(&outcome, Some("root:"), ProtocolModule::Http, false);
    assert_eq!(result.classification, dotpath_fuzz::Classification::FalsePositive);
}

#[tokio::test]
async fn connection_refused_is_surfaced_as_a_probe_error() {
    // Nothing is listening on this port.
    let probe = HttpProbe::new("http://127.0.0.1:1".to_string(), "GET".to_string(), false, vec![]);
    let payload = Payload::from_string("../../../etc/passwd");

    let outcome = probe.probe(&payload, Duration::from_secs(2)).await;
    assert!(outcome.error.is_some());
    let result = classify(&outcome, Some("root:"), ProtocolModule::Http, false);
    assert_eq!(result.classification, dotpath_fuzz::Classification::Error);
}
