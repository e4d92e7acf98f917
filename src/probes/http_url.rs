//! `http_url` probe: the traversal payload is substituted into a literal
//! `TRAVERSAL` token somewhere in a user-supplied URL template, byte-for-byte,
//! with no re-encoding. Requires a success `pattern` (enforced by
//! `ScanConfig::validate`), since an arbitrary template gives the oracle no
//! other way to tell a 200 OK from a 200-with-nothing-interesting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::constants::{DEFAULT_USER_AGENTS, RESPONSE_CAP};
use crate::error::ProbeError;
use crate::probes::{read_capped, substitute_traversal_token, tls, Probe};
use crate::types::{Payload, ProbeOutcome};

pub struct HttpUrlProbe {
    pub endpoint_template: String,
    pub method: String,
    pub ssl: bool,
    client: reqwest::Client,
    user_agents: Vec<String>,
    counter: AtomicUsize,
}

impl HttpUrlProbe {
    pub fn new(endpoint_template: String, method: String, ssl: bool, user_agents: Vec<String>) -> Self {
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
        HttpUrlProbe {
            endpoint_template,
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

    async fn probe_via_reqwest(&self, payload: &Payload, rendered: String, timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();
        let method = self
            .method
            .parse::<reqwest::Method>()
            .unwrap_or(reqwest::Method::GET);

        let request = self
            .client
            .request(method, &rendered)
            .header("User-Agent", self.pick_user_agent())
            .timeout(timeout)
            .build();

        let request = match request {
            Ok(r) => r,
            Err(e) => {
                return ProbeOutcome::err(payload.clone(), rendered, ProbeError::Protocol(e.to_string()))
            }
        };

        match self.client.execute(request).await {
            Ok(response) => {
                let status = Some(response.status().as_u16());
                let body = response.bytes().await.unwrap_or_default();
                let capped = body[..body.len().min(RESPONSE_CAP)].to_vec();
                ProbeOutcome::ok(payload.clone(), rendered, status, capped, start.elapsed())
            }
            Err(e) => {
                let kind = if e.is_timeout() {
                    ProbeError::Timeout
                } else if e.is_connect() {
                    ProbeError::Refused
                } else {
                    ProbeError::Protocol(e.to_string())
                };
                ProbeOutcome::err(payload.clone(), rendered, kind)
            }
        }
    }

    async fn probe_raw(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let rendering_bytes = substitute_traversal_token(self.endpoint_template.as_bytes(), payload);
        let rendering = String::from_utf8_lossy(&rendering_bytes).into_owned();
        let start = Instant::now();

        let parsed = match url::Url::parse(&self.endpoint_template) {
            Ok(u) => u,
            Err(e) => {
                return ProbeOutcome::err(payload.clone(), rendering, ProbeError::Protocol(e.to_string()))
            }
        };
        let host = parsed.host_str().unwrap_or("localhost").to_string();
        let port = parsed
            .port_or_known_default()
            .unwrap_or(if self.ssl { 443 } else { 80 });

        let mut path_and_query = parsed.path().to_string();
        if let Some(q) = parsed.query() {
            path_and_query.push('?');
            path_and_query.push_str(q);
        }
        let path_bytes = substitute_traversal_token(path_and_query.as_bytes(), payload);

        let mut request_line = Vec::new();
        request_line.extend_from_slice(self.method.as_bytes());
        request_line.push(b' ');
        request_line.extend_from_slice(&path_bytes);
        request_line.extend_from_slice(b" HTTP/1.1\r\nHost: ");
        request_line.extend_from_slice(host.as_bytes());
        request_line.extend_from_slice(b"\r\nUser-Agent: ");
        request_line.extend_from_slice(self.pick_user_agent().as_bytes());
        request_line.extend_from_slice(b"\r\nConnection: close\r\n\r\n");

        let connect = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await;
        let stream = match connect {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return ProbeOutcome::err(payload.clone(), rendering, classify_io_error(&e)),
            Err(_) => return ProbeOutcome::err(payload.clone(), rendering, ProbeError::Timeout),
        };

        let result = if self.ssl {
            self.write_and_read_tls(stream, &host, &request_line, timeout).await
        } else {
            self.write_and_read_plain(stream, &request_line, timeout).await
        };

        match result {
            Ok((status, body)) => ProbeOutcome::ok(payload.clone(), rendering, status, body, start.elapsed()),
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, e),
        }
    }

    async fn write_and_read_plain(
        &self,
        mut stream: TcpStream,
        request_line: &[u8],
        timeout: Duration,
    ) -> Result<(Option<u16>, Vec<u8>), ProbeError> {
        stream.write_all(request_line).await.map_err(|e| classify_io_error(&e))?;
        let body = tokio::time::timeout(timeout, read_capped(&mut stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;
        Ok((parse_status_line(&body), body))
    }

    async fn write_and_read_tls(
        &self,
        stream: TcpStream,
        host: &str,
        request_line: &[u8],
        timeout: Duration,
    ) -> Result<(Option<u16>, Vec<u8>), ProbeError> {
        let mut tls_stream = tls::connect_tls(stream, host, timeout).await?;
        tls_stream.write_all(request_line).await.map_err(|e| classify_io_error(&e))?;
        let body = tokio::time::timeout(timeout, read_capped(&mut tls_stream, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;
        Ok((parse_status_line(&body), body))
    }
}

#[async_trait]
impl Probe for HttpUrlProbe {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let needs_raw = payload.as_bytes().contains(&0) || std::str::from_utf8(payload.as_bytes()).is_err();
        if needs_raw {
            self.probe_raw(payload, timeout).await
        } else {
            let rendered_bytes = substitute_traversal_token(self.endpoint_template.as_bytes(), payload);
            let rendered = String::from_utf8(rendered_bytes)
                .unwrap_or_else(|_| self.endpoint_template.clone());
            self.probe_via_reqwest(payload, rendered, timeout).await
        }
    }
}

fn parse_status_line(body: &[u8]) -> Option<u16> {
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
