//! Raw-socket probe: a user-supplied byte template with one `TRAVERSAL`
//! substitution, written once to a `tokio::net::TcpStream` (optionally
//! wrapped in TLS), then read until the peer closes, the timeout fires, or
//! the response cap is hit. For protocols this crate has no dedicated
//! probe for.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::constants::RESPONSE_CAP;
use crate::error::ProbeError;
use crate::probes::{read_capped, substitute_traversal_token, tls, Probe};
use crate::types::{Payload, ProbeOutcome};

pub struct RawProbe {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub template: Vec<u8>,
}

impl RawProbe {
    pub fn new(host: String, port: u16, ssl: bool, template: Vec<u8>) -> Self {
        RawProbe { host, port, ssl, template }
    }
}

#[async_trait]
impl Probe for RawProbe {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let rendering = format!("{}:{}/{}", self.host, self.port, payload.to_string_lossy());
        let start = Instant::now();
        let wire = substitute_traversal_token(&self.template, payload);

        let connect = tokio::time::timeout(timeout, TcpStream::connect((self.host.as_str(), self.port))).await;
        let stream = match connect {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return ProbeOutcome::err(payload.clone(), rendering, classify_io_error(&e)),
            Err(_) => return ProbeOutcome::err(payload.clone(), rendering, ProbeError::Timeout),
        };

        let result = if self.ssl {
            self.write_and_read_tls(stream, &wire, timeout).await
        } else {
            self.write_and_read_plain(stream, &wire, timeout).await
        };

        match result {
            Ok(body) => {
                let status = parse_status_line(&body);
                ProbeOutcome::ok(payload.clone(), rendering, status, body, start.elapsed())
            }
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, e),
        }
    }
}

impl RawProbe {
    async fn write_and_read_plain(
        &self,
        mut stream: TcpStream,
        wire: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ProbeError> {
        stream.write_all(wire).await.map_err(|e| classify_io_error(&e))?;
        tokio::time::timeout(timeout, read_capped(&mut stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))
    }

    async fn write_and_read_tls(
        &self,
        stream: TcpStream,
        wire: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ProbeError> {
        let mut tls_stream = tls::connect_tls(stream, &self.host, timeout).await?;
        tls_stream.write_all(wire).await.map_err(|e| classify_io_error(&e))?;
        tokio::time::timeout(timeout, read_capped(&mut tls_stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))
    }
}

/// Best-effort status extraction for templates that happen to speak HTTP;
/// non-HTTP protocols simply never match and the oracle falls back to
/// treating any non-empty body as a live response.
fn parse_status_line(body: &[u8]) -> Option<u16> {
    if !body.starts_with(b"HTTP/") {
        return None;
    }
    let line_end = body.iter().position(|&b| b == b'\n')?;
    let line = std::str::from_utf8(&body[..line_end]).ok()?;
    line.split_whitespace().nth(1)?.parse::<u16>().ok()
}

fn classify_io_error(e: &std::io::Error) -> ProbeError {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::ConnectionRefused => ProbeError::Refused,
        ErrorKind::ConnectionReset => ProbeError::Reset,
        ErrorKind::TimedOut => ProbeError::Timeout,
        _ => ProbeError::Protocol(e.to_string()),
    }
}
