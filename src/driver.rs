//! Fuzzing Driver (C5): `run_scan`, the async orchestrator that turns a
//! `ScanConfig` into a `ScanResult` by generating payloads, dispatching them
//! through the configured protocol probe, and classifying each response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::bisection::{self, BisectionParams, BisectionTester};
use crate::constants::{DEFAULT_FTP_PASS, DEFAULT_FTP_USER};
use crate::error::{FuzzError, ProbeError};
use crate::generator::{generate, GenerateParams};
use crate::oracle::{classify, excerpt};
use crate::probes::ftp::FtpProbe;
use crate::probes::http::HttpProbe;
use crate::probes::http_url::HttpUrlProbe;
use crate::probes::raw::RawProbe;
use crate::probes::tftp::TftpProbe;
use crate::probes::Probe;
use crate::types::{
    ErrorRecord, FalsePositive, Payload, ProbeOutcome, ProtocolModule, ScanConfig, ScanResult,
    Vulnerability,
};

/// `(index, total, payload)`, invoked once per dispatched payload. Ordering
/// matches generator order only when `max_concurrency == 1`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &Payload) + Send + Sync>;

pub async fn run_scan(
    config: ScanConfig,
    progress: Option<ProgressCallback>,
    cancel: CancellationToken,
) -> Result<ScanResult, FuzzError> {
    config.validate()?;

    let gen_params = GenerateParams {
        os: config.os,
        depth: config.depth,
        method: config.method,
        target_file: config.target_file.clone(),
        extra_files: config.extra_files,
        extension: config.extension.clone(),
        bisection_depth: None,
    };
    let payloads = generate(&gen_params)?;
    let total = payloads.len();

    let probe: Arc<dyn Probe> = build_probe(&config)?;
    let max_concurrency = match config.protocol {
        ProtocolModule::Ftp | ProtocolModule::Tftp => 1,
        _ => config.max_concurrency.max(1),
    };
    let semaphore = Arc::new(Semaphore::new(max_concurrency));

    let result = Arc::new(Mutex::new(ScanResult::default()));
    let started = Instant::now();
    let mut join_set = tokio::task::JoinSet::new();

    for (index, payload) in payloads.into_iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        if let Some(cb) = &progress {
            cb(index, total, &payload);
        }

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };
        let probe = probe.clone();
        let timeout = config.timeout;
        let protocol = config.protocol;
        let pattern = config.pattern.clone();
        let tftp_flag = config.tftp_error_code_2_is_vulnerable;
        let break_on_first = config.break_on_first;
        let continue_on_error = config.continue_on_error;
        let delay = config.delay;
        let result = result.clone();
        let cancel_task = cancel.clone();

        join_set.spawn(async move {
            let outcome = tokio::select! {
                _ = cancel_task.cancelled() => return,
                outcome = probe.probe(&payload, timeout) => outcome,
            };
            drop(permit);

            record_outcome(
                &result,
                outcome,
                pattern.as_deref(),
                protocol,
                tftp_flag,
                break_on_first,
                continue_on_error,
                &cancel_task,
            );

            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
        });
    }

    while join_set.join_next().await.is_some() {}

    let mut final_result = Arc::try_unwrap(result)
        .map(Mutex::into_inner)
        .unwrap_or_else(|arc| arc.lock().clone());
    final_result.duration = started.elapsed();

    if config.bisection && !final_result.vulnerabilities.is_empty() {
        run_bisection_pass(&config, probe, &mut final_result).await;
    }

    if cancel.is_cancelled() {
        return Err(FuzzError::Cancelled);
    }

    Ok(final_result)
}

#[allow(clippy::too_many_arguments)]
fn record_outcome(
    result: &Mutex<ScanResult>,
    outcome: ProbeOutcome,
    pattern: Option<&str>,
    protocol: ProtocolModule,
    tftp_flag: bool,
    break_on_first: bool,
    continue_on_error: bool,
    cancel: &CancellationToken,
) {
    let verdict = classify(&outcome, pattern, protocol, tftp_flag);
    let mut guard = result.lock();
    guard.total_tests += 1;

    match verdict.classification {
        crate::types::Classification::Vulnerable => {
            let analysis = bisection::analyze_traversal_pattern(&outcome.endpoint_rendering);
            let matched_excerpt = verdict
                .matched_range
                .map(|range| excerpt(&outcome.body_preview, range));
            guard.vulnerabilities.push(Vulnerability {
                payload: outcome.payload,
                endpoint_rendering: outcome.endpoint_rendering,
                matched_excerpt,
                status: outcome.status,
                elapsed: outcome.elapsed,
                bisected_depth: None,
                analysis: Some(analysis),
            });
            if break_on_first {
                cancel.cancel();
            }
        }
        crate::types::Classification::FalsePositive => {
            guard.false_positives.push(FalsePositive {
                payload: outcome.payload,
                endpoint_rendering: outcome.endpoint_rendering,
                status: outcome.status,
            });
        }
        crate::types::Classification::Error => {
            let is_connection_error = outcome
                .error
                .as_ref()
                .map(|e| e.is_connection_error())
                .unwrap_or(false);
            // The oracle's `Error` bucket also covers the implicit `filtered`
            // state (no response at all, no transport error populated) —
            // synthesize a record so the payload still lands in exactly one
            // bucket instead of vanishing after `total_tests` counts it.
            let error = outcome
                .error
                .unwrap_or_else(|| ProbeError::Protocol("no response received".to_string()));
            guard.errors.push(ErrorRecord {
                payload: outcome.payload,
                endpoint_rendering: outcome.endpoint_rendering,
                error,
            });
            if !continue_on_error && is_connection_error {
                cancel.cancel();
            }
        }
    }
}

async fn run_bisection_pass(config: &ScanConfig, probe: Arc<dyn Probe>, result: &mut ScanResult) {
    let tester = ProbeBisectionTester {
        probe,
        pattern: config.pattern.clone(),
        protocol: config.protocol,
        tftp_flag: config.tftp_error_code_2_is_vulnerable,
        timeout: config.timeout,
    };
    let params = BisectionParams {
        os: config.os,
        target_file: config.target_file.clone(),
        extension: config.extension.clone(),
        delay: config.delay,
    };

    if let Some(first) = result.vulnerabilities.first_mut() {
        if let Some(depth) = bisection::find_minimum_depth(&tester, 1, config.depth.max(1), &params).await {
            first.bisected_depth = Some(depth);
        }
    }
}

struct ProbeBisectionTester {
    probe: Arc<dyn Probe>,
    pattern: Option<String>,
    protocol: ProtocolModule,
    tftp_flag: bool,
    timeout: Duration,
}

#[async_trait]
impl BisectionTester for ProbeBisectionTester {
    async fn test_vulnerability(&self, payload: &Payload) -> bool {
        let outcome = self.probe.probe(payload, self.timeout).await;
        classify(&outcome, self.pattern.as_deref(), self.protocol, self.tftp_flag).classification
            == crate::types::Classification::Vulnerable
    }
}

fn build_probe(config: &ScanConfig) -> Result<Arc<dyn Probe>, FuzzError> {
    match config.protocol {
        ProtocolModule::Http => Ok(Arc::new(HttpProbe::new(
            config.endpoint.clone(),
            config.http_method.clone(),
            config.ssl,
            config.user_agents.clone(),
        ))),
        ProtocolModule::HttpUrl => Ok(Arc::new(HttpUrlProbe::new(
            config.endpoint.clone(),
            config.http_method.clone(),
            config.ssl,
            config.user_agents.clone(),
        ))),
        ProtocolModule::Ftp => {
            let (host, port) = parse_host_port(&config.endpoint, 21)?;
            let (username, password) = match &config.credentials {
                Some(c) => (c.username.clone(), c.password.clone()),
                None => (DEFAULT_FTP_USER.to_string(), DEFAULT_FTP_PASS.to_string()),
            };
            Ok(Arc::new(FtpProbe::new(host, port, username, password)))
        }
        ProtocolModule::Tftp => {
            let (host, port) = parse_host_port(&config.endpoint, 69)?;
            Ok(Arc::new(TftpProbe::new(host, port)))
        }
        ProtocolModule::Payload => {
            let (host, port) = parse_host_port(&config.endpoint, 80)?;
            let template = config
                .payload_template
                .as_deref()
                .unwrap_or_default()
                .as_bytes()
                .to_vec();
            Ok(Arc::new(RawProbe::new(host, port, config.ssl, template)))
        }
        ProtocolModule::Stdout => Ok(Arc::new(crate::probes::stdout::StdoutProbe)),
    }
}

fn parse_host_port(endpoint: &str, default_port: u16) -> Result<(String, u16), FuzzError> {
    match endpoint.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| FuzzError::InvalidConfig(format!("invalid port in endpoint: {endpoint}")))?;
            Ok((host.to_string(), port))
        }
        None => Ok((endpoint.to_string(), default_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_host_and_port() {
        assert_eq!(parse_host_port("10.0.0.1:2121", 21).unwrap(), ("10.0.0.1".to_string(), 2121));
    }

    #[test]
    fn falls_back_to_default_port() {
        assert_eq!(parse_host_port("10.0.0.1", 21).unwrap(), ("10.0.0.1".to_string(), 21));
    }
}
