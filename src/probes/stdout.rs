//! `stdout` probe: prints the rendered payload instead of sending it
//! anywhere, for piping into an external collaborator (shell script,
//! another fuzzer) that owns the real oracle. The probe's own "response" is
//! the payload itself, so the generic oracle can still classify it against
//! a `--pattern` if one was configured.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::types::{Payload, ProbeOutcome};

use super::Probe;

pub struct StdoutProbe;

#[async_trait]
impl Probe for StdoutProbe {
    async fn probe(&self, payload: &Payload, _timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();
        let rendering = payload.to_string_lossy();
        println!("{rendering}");
        ProbeOutcome::ok(
            payload.clone(),
            rendering,
            None,
            payload.as_bytes().to_vec(),
            start.elapsed(),
        )
    }
}
