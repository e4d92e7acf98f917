//! Protocol Probes (C4): one file per protocol, all implementing `Probe`.
//!
//! A probe's only job is transport: send a payload, read a bounded response,
//! and hand back a `ProbeOutcome`. Classification (`oracle::classify`) and
//! concurrency (`driver::run_scan`) both live outside this module.

pub mod ftp;
pub mod http;
pub mod http_url;
pub mod raw;
pub mod stdout;
pub mod tftp;
pub mod tls;

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Payload, ProbeOutcome};

#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome;
}

/// Read from `reader` until EOF, timeout, or `RESPONSE_CAP` bytes, whichever
/// comes first. Shared by the raw-line HTTP fallback, FTP, and the raw
/// template probe.
pub(crate) async fn read_capped<R>(reader: &mut R, cap: usize) -> std::io::Result<Vec<u8>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if buf.len() >= cap {
            break;
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let take = n.min(cap - buf.len());
        buf.extend_from_slice(&chunk[..take]);
    }
    Ok(buf)
}

/// Substitute every occurrence of `TRAVERSAL` in `template` with the
/// payload's raw bytes, at the byte level (no re-encoding), per the
/// null-byte-preserving contract the payload storage model requires.
pub(crate) fn substitute_traversal_token(template: &[u8], payload: &Payload) -> Vec<u8> {
    const TOKEN: &[u8] = b"TRAVERSAL";
    let mut out = Vec::with_capacity(template.len());
    let mut i = 0;
    while i < template.len() {
        if template[i..].starts_with(TOKEN) {
            out.extend_from_slice(payload.as_bytes());
            i += TOKEN.len();
        } else {
            out.push(template[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_occurrence() {
        let template = b"GET /TRAVERSAL/x?a=TRAVERSAL HTTP/1.1\r\n";
        let payload = Payload::from_string("../../etc/passwd");
        let out = substitute_traversal_token(template, &payload);
        let rendered = String::from_utf8_lossy(&out);
        assert_eq!(
            rendered,
            "GET /../../etc/passwd/x?a=../../etc/passwd HTTP/1.1\r\n"
        );
    }

    #[test]
    fn preserves_embedded_nul_in_substitution() {
        let template = b"RETR TRAVERSAL\r\n";
        let payload = Payload::from_string("../secret\0.png");
        let out = substitute_traversal_token(template, &payload);
        assert!(out.contains(&0u8));
    }
}
