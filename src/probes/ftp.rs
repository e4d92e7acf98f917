//! FTP probe: a minimal RFC 959 client subset over `tokio::net::TcpStream`
//! — connect, `USER`/`PASS`, `TYPE I`, `PASV`, `RETR {payload}` on the data
//! connection PASV opens, then read until EOF or the size cap. No FTP crate
//! exists in the wider ecosystem this corpus draws from; the protocol
//! surface needed here is a handful of commands, so it's hand-rolled the
//! same way the raw and TFTP probes are.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::constants::RESPONSE_CAP;
use crate::error::ProbeError;
use crate::probes::{read_capped, Probe};
use crate::types::{Payload, ProbeOutcome};

pub struct FtpProbe {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl FtpProbe {
    pub fn new(host: String, port: u16, username: String, password: String) -> Self {
        FtpProbe { host, port, username, password }
    }

    async fn run(&self, payload: &Payload, timeout: Duration) -> Result<(Option<u16>, Vec<u8>), ProbeError> {
        let mut control = connect(&self.host, self.port, timeout).await?;

        read_reply(&mut control, timeout).await?; // 220 greeting

        send_command(&mut control, &format!("USER {}\r\n", self.username)).await?;
        read_reply(&mut control, timeout).await?;

        send_command(&mut control, &format!("PASS {}\r\n", self.password)).await?;
        let (login_code, _) = read_reply(&mut control, timeout).await?;
        if login_code != 230 && login_code != 331 {
            return Ok((Some(login_code), Vec::new()));
        }

        send_command(&mut control, "TYPE I\r\n").await?;
        read_reply(&mut control, timeout).await?;

        send_command(&mut control, "PASV\r\n").await?;
        let (pasv_code, pasv_line) = read_reply(&mut control, timeout).await?;
        if pasv_code != 227 {
            return Ok((Some(pasv_code), Vec::new()));
        }
        let (data_host, data_port) =
            parse_pasv(&pasv_line).ok_or_else(|| ProbeError::Protocol("malformed PASV reply".to_string()))?;

        let mut data_conn = connect(&data_host, data_port, timeout).await?;

        // RETR's filename is the payload's raw bytes: may contain a NUL or
        // other control byte the oracle depends on surviving unmangled.
        let mut retr = Vec::new();
        retr.extend_from_slice(b"RETR ");
        retr.extend_from_slice(payload.as_bytes());
        retr.extend_from_slice(b"\r\n");
        control.write_all(&retr).await.map_err(|e| classify_io_error(&e))?;

        let (retr_code, _) = read_reply(&mut control, timeout).await?;
        if retr_code != 150 && retr_code != 125 {
            return Ok((Some(retr_code), Vec::new()));
        }

        let body = tokio::time::timeout(timeout, read_capped(&mut data_conn, RESPONSE_CAP))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;

        let (final_code, _) = read_reply(&mut control, timeout).await.unwrap_or((226, String::new()));

        Ok((Some(final_code), body))
    }
}

#[async_trait]
impl Probe for FtpProbe {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let rendering = format!("ftp://{}:{}/{}", self.host, self.port, payload.to_string_lossy());
        let start = Instant::now();
        match self.run(payload, timeout).await {
            Ok((status, body)) => ProbeOutcome::ok(payload.clone(), rendering, status, body, start.elapsed()),
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, e),
        }
    }
}

async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ProbeError> {
    tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(|e| classify_io_error(&e))
}

async fn send_command(stream: &mut TcpStream, command: &str) -> Result<(), ProbeError> {
    stream.write_all(command.as_bytes()).await.map_err(|e| classify_io_error(&e))
}

async fn read_reply(stream: &mut TcpStream, timeout: Duration) -> Result<(u16, String), ProbeError> {
    let mut buf = [0u8; 4096];
    let n = tokio::time::timeout(timeout, stream.read(&mut buf))
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(|e| classify_io_error(&e))?;
    if n == 0 {
        return Err(ProbeError::Reset);
    }
    let line = String::from_utf8_lossy(&buf[..n]).into_owned();
    let code = line.get(0..3).and_then(|c| c.parse::<u16>().ok()).unwrap_or(0);
    Ok((code, line))
}

/// Parse `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).` into an address.
fn parse_pasv(line: &str) -> Option<(String, u16)> {
    let open = line.find('(')?;
    let close = line.find(')')?;
    let nums: Vec<u16> = line[open + 1..close]
        .split(',')
        .filter_map(|n| n.trim().parse::<u16>().ok())
        .collect();
    if nums.len() != 6 {
        return None;
    }
    let host = format!("{}.{}.{}.{}", nums[0], nums[1], nums[2], nums[3]);
    let port = nums[4] * 256 + nums[5];
    Some((host, port))
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
    fn parses_pasv_reply() {
        let line = "227 Entering Passive Mode (127,0,0,1,195,149).";
        let (host, port) = parse_pasv(line).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 195 * 256 + 149);
    }

    #[test]
    fn rejects_malformed_pasv_reply() {
        assert!(parse_pasv("227 no parens here").is_none());
    }
}
