//! TFTP probe: `tokio::net::UdpSocket`, wire layout bit-exact to RFC 1350 —
//! `RRQ` (opcode 1) with the payload as filename, `octet` transfer mode, then
//! a receive that's either a `DATA` packet (opcode 3, file transferred) or an
//! `ERROR` packet (opcode 5, with its own error code). On `DATA`, the first
//! block is ACKed and a few more blocks are read to build a fuller preview;
//! a timeout or short read on a follow-up block just ends the preview early,
//! since the first block already proved disclosure. No
//! `byteorder` dependency: two-byte fields are framed with plain
//! `to_be_bytes()`/`from_be_bytes()`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::constants::RESPONSE_CAP;
use crate::error::ProbeError;
use crate::types::{Payload, ProbeOutcome};

use super::Probe;

const OPCODE_RRQ: u16 = 1;
const OPCODE_DATA: u16 = 3;
const OPCODE_ACK: u16 = 4;
const OPCODE_ERROR: u16 = 5;

/// Bound on the number of additional `DATA` blocks read (after ACKing the
/// first) to build a fuller preview.
const MAX_PREVIEW_BLOCKS: u32 = 4;

pub struct TftpProbe {
    pub host: String,
    pub port: u16,
}

impl TftpProbe {
    pub fn new(host: String, port: u16) -> Self {
        TftpProbe { host, port }
    }

    async fn run(&self, payload: &Payload, timeout: Duration) -> Result<(u16, Option<u16>, Vec<u8>), ProbeError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(|e| classify_io_error(&e))?;
        socket
            .connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| classify_io_error(&e))?;

        let mut packet = Vec::with_capacity(2 + payload.len() + 1 + 6);
        packet.extend_from_slice(&OPCODE_RRQ.to_be_bytes());
        packet.extend_from_slice(payload.as_bytes());
        packet.push(0);
        packet.extend_from_slice(b"octet");
        packet.push(0);

        socket.send(&packet).await.map_err(|e| classify_io_error(&e))?;

        let mut buf = vec![0u8; RESPONSE_CAP.min(65536)];
        let n = tokio::time::timeout(timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| classify_io_error(&e))?;
        buf.truncate(n);

        if buf.len() < 2 {
            return Err(ProbeError::Protocol("short TFTP packet".to_string()));
        }
        let opcode = u16::from_be_bytes([buf[0], buf[1]]);

        match opcode {
            OPCODE_DATA => {
                let mut preview = buf[4.min(buf.len())..].to_vec();
                let mut block = u16::from_be_bytes([buf[2], buf[3]]);
                ack(&socket, block).await.map_err(|e| classify_io_error(&e))?;

                for _ in 0..MAX_PREVIEW_BLOCKS {
                    let mut next = vec![0u8; RESPONSE_CAP.min(65536)];
                    let n = match tokio::time::timeout(timeout, socket.recv(&mut next)).await {
                        Ok(Ok(n)) => n,
                        // A timeout or transport error reading follow-up blocks just
                        // ends the preview early; the first DATA block already proved
                        // the file disclosed.
                        _ => break,
                    };
                    next.truncate(n);
                    if next.len() < 4 || u16::from_be_bytes([next[0], next[1]]) != OPCODE_DATA {
                        break;
                    }
                    block = u16::from_be_bytes([next[2], next[3]]);
                    preview.extend_from_slice(&next[4..]);
                    let is_final = next.len() < 4 + 512;
                    ack(&socket, block).await.map_err(|e| classify_io_error(&e))?;
                    if is_final {
                        break;
                    }
                }

                Ok((OPCODE_DATA, None, preview))
            }
            OPCODE_ERROR if buf.len() >= 4 => {
                let error_code = u16::from_be_bytes([buf[2], buf[3]]);
                Ok((OPCODE_ERROR, Some(error_code), buf[4..].to_vec()))
            }
            other => Ok((other, None, Vec::new())),
        }
    }
}

#[async_trait]
impl Probe for TftpProbe {
    async fn probe(&self, payload: &Payload, timeout: Duration) -> ProbeOutcome {
        let rendering = format!("tftp://{}:{}/{}", self.host, self.port, payload.to_string_lossy());
        let start = Instant::now();
        match self.run(payload, timeout).await {
            Ok((opcode, error_code, body)) => {
                let mut outcome = ProbeOutcome::ok(
                    payload.clone(),
                    rendering,
                    Some(opcode),
                    body,
                    start.elapsed(),
                );
                outcome.tftp_error_code = error_code;
                outcome
            }
            Err(e) => ProbeOutcome::err(payload.clone(), rendering, e),
        }
    }
}

async fn ack(socket: &UdpSocket, block: u16) -> std::io::Result<()> {
    let mut ack_packet = Vec::with_capacity(4);
    ack_packet.extend_from_slice(&OPCODE_ACK.to_be_bytes());
    ack_packet.extend_from_slice(&block.to_be_bytes());
    socket.send(&ack_packet).await?;
    Ok(())
}

fn classify_io_error(e: &std::io::Error) -> ProbeError {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::ConnectionRefused => ProbeError::Refused,
        ErrorKind::TimedOut => ProbeError::Timeout,
        _ => ProbeError::Protocol(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrq_packet_frames_opcode_and_mode() {
        let payload = Payload::from_string("../../../etc/passwd");
        let mut packet = Vec::new();
        packet.extend_from_slice(&OPCODE_RRQ.to_be_bytes());
        packet.extend_from_slice(payload.as_bytes());
        packet.push(0);
        packet.extend_from_slice(b"octet");
        packet.push(0);
        assert_eq!(&packet[0..2], &[0, 1]);
        assert!(packet.ends_with(b"octet\0"));
    }

    #[tokio::test]
    async fn ack_packet_carries_opcode_four_and_the_block_number() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(server_addr).await.unwrap();

        ack(&client, 7).await.unwrap();

        let mut buf = [0u8; 4];
        let n = server.recv(&mut buf).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(u16::from_be_bytes([buf[0], buf[1]]), OPCODE_ACK);
        assert_eq!(u16::from_be_bytes([buf[2], buf[3]]), 7);
    }
}
