//! HTTP probe: `reqwest` for the happy path, a hand-rolled request line over
//! raw `tokio::net::TcpStream`/`TlsStream` whenever the payload carries a
//! byte the HTTP/URL stack would reject or silently re-encode (a literal
//! NUL, or anything that isn't valid UTF-8).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::constants::{DEFAULT_USER_AGENTS, RESPONSE_CAP};
use crate::error::ProbeError;
use crate::probes::{read_capped, Probe};
use crate::types::{Payload, ProbeOutcome};

pub struct HttpProbe {
    pub endpoint: String,
    pub method: String,
    pub ssl: bool,
    pub client: reqwest::Client,
    user_agents: Vec<String>,
    counter: AtomicUsize,
}

impl HttpProbe {
    pub fn new(endpoint: String, method: String, ssl: bool, user_agents: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("reqwest client with rustls backend must build");
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };
        HttpProbe {
            endpoint,
            method,
            ssl,
            client,
            user_agents,
            counter: AtomicUsize::new(0),
        }
    }

    fn pick_user_agent(&self) -> &str {
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        self.user_agents
            .get(idx % self.user_agents.len())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    fn needs_raw_fallback(payload: &Payload) -> bool {
        payload.as_bytes().contains(&0) || std::str::from_utf8(payload.as_bytes()).is_err()
    }

    async fn probe_via_reqwest(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let path = payload.to_string_lossy();
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), path);
        let rendering = url.clone();
        let start = Instant::now();

        let method = self
            .method
            .parse::<reqwest::Method>()
            .unwrap_or(reqwest::Method::GET);

        let request = self
            .client
            .request(method, &url)
            .header("User-Agent", self.pick_user_agent())
            .timeout(timeout)
            .build();

        let request = match request {
            Ok(r) => r,
            Err(e) => {
                return ProbeOutcome::err(
                    payload.clone(),
                    rendering,
                    ProbeError::Protocol(e.to_string()),
                )
            }
        };

        match self.client.execute(request).await {
            Ok(response) => {
                let status = Some(response.status().as_u16());
                let body = response.bytes().await.unwrap_or_default();
                let capped = body[..body.len().min(RESPONSE_CAP)].to_vec();
                ProbeOutcome::ok(payload.clone(), rendering, status, capped, start.elapsed())
            }
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, classify_reqwest_error(&e)),
        }
    }

    async fn probe_raw(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let rendering = format!("{}{}", self.endpoint, payload.to_string_lossy());
        let start = Instant::now();

        let parsed = match url::Url::parse(&self.endpoint) {
            Ok(u) => u,
            Err(e) => {
                return ProbeOutcome::err(
                    payload.clone(),
                    rendering,
                    ProbeError::Protocol(e.to_string()),
                )
            }
        };
        let host = parsed.host_str().unwrap_or("localhost").to_string();
        let port = parsed
            .port_or_known_default()
            .unwrap_or(if self.ssl { 443 } else { 80 });
        let base_path = if parsed.path().is_empty() {
            "/".to_string()
        } else {
            parsed.path().to_string()
        };

        let mut request_line = Vec::new();
        request_line.extend_from_slice(self.method.as_bytes());
        request_line.extend_from_slice(b" ");
        request_line.extend_from_slice(base_path.as_bytes());
        request_line.extend_from_slice(payload.as_bytes());
        request_line.extend_from_slice(b" HTTP/1.1\r\nHost: ");
        request_line.extend_from_slice(host.as_bytes());
        request_line.extend_from_slice(b"\r\nUser-Agent: ");
        request_line.extend_from_slice(self.pick_user_agent().as_bytes());
        request_line.extend_from_slice(b"\r\nConnection: close\r\n\r\n");

        let connect = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await;
        let stream = match connect {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                return ProbeOutcome::err(payload.clone(), rendering, classify_io_error(&e))
            }
            Err(_) => return ProbeOutcome::err(payload.clone(), rendering, ProbeError::Timeout),
        };

        let outcome = if self.ssl {
            self.probe_raw_tls(stream, &host, &request_line, timeout, payload, &rendering)
                .await
        } else {
            self.probe_raw_plain(stream, &request_line, timeout, payload, &rendering)
                .await
        };

        match outcome {
            Ok((status, body)) => ProbeOutcome::ok(payload.clone(), rendering, status, body, start.elapsed()),
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, e),
        }
    }

    async fn probe_raw_plain(
        &self,
        mut stream: TcpStream,
        request_line: &[u8],
        timeout: Duration,
        _payload: &Payload,
        _rendering: &str,
    ) -> Result<(Option<u16>, Vec<u8>), ProbeError> {
        stream
            .write_all(request_line)
            .await
            .map_err(|e| classify_io_error(&e))?;
        let body = tokio::time::timeout(timeout, read_capped(&mut stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;
        Ok((parse_status_line(&body), body))
    }

    async fn probe_raw_tls(
        &self,
        stream: TcpStream,
        host: &str,
        request_line: &[u8],
        timeout: Duration,
        _payload: &Payload,
        _rendering: &str,
    ) -> Result<(Option<u16>, Vec<u8>), ProbeError> {
        let mut tls_stream = crate::probes::tls::connect_tls(stream, host, timeout).await?;

        tls_stream
            .write_all(request_line)
            .await
            .map_err(|e| classify_io_error(&e))?;
        let body = tokio::time::timeout(timeout, read_capped(&mut tls_stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;
        Ok((parse_status_line(&body), body))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        if Self::needs_raw_fallback(payload) {
            self.probe_raw(payload, timeout).await
        } else {
            self.probe_via_reqwest(payload, timeout).await
        }
    }
}

fn parse_status_line(body: &[u8]) -> Option<u16> {
    let line_end = body.iter().position(|&b| b == b'\n')?;
    let line = std::str::from_utf8(&body[..line_end]).ok()?;
    line.split_whitespace().nth(1)?.parse::<u16>().ok()
}

fn classify_reqwest_error(e: &reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else if e.is_connect() {
        ProbeError::Refused
    } else {
        ProbeError::Protocol(e.to_string())
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_need_for_raw_fallback_on_embedded_nul() {
        let p = Payload::from_string("a\0b");
        assert!(HttpProbe::needs_raw_fallback(&p));
    }

    #[test]
    fn clean_payload_does_not_need_raw_fallback() {
        let p = Payload::from_string("../../../etc/passwd");
        assert!(!HttpProbe::needs_raw_fallback(&p));
    }

    #[test]
    fn parses_status_from_response_line() {
        let body = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
        assert_eq!(parse_status_line(body), Some(200));
    }
}
