//! Core data model: OS tags, detection methods, payloads,
//! probe outcomes, classification, and the scan config/result shapes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Operating system tag. `Generic` is the union of per-OS file lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsType {
    Windows,
    Unix,
    Generic,
}

impl OsType {
    /// Classify an nmap-style OS banner string into an `OsType`.
    ///
    /// Ported from DotDotPwn's `traversal_engine.py::detect_os_type`: this is
    /// a pure string classifier, not the excluded external port-scanner
    /// invocation, which remains an external collaborator.
    pub fn from_os_banner(banner: &str) -> Self {
        if banner.is_empty() {
            return OsType::Generic;
        }
        let lower = banner.to_lowercase();
        const WINDOWS_KEYWORDS: &[&str] = &["windows", "microsoft", "win"];
        const UNIX_KEYWORDS: &[&str] = &["linux", "unix", "bsd", "solaris", "aix"];
        if WINDOWS_KEYWORDS.iter().any(|k| lower.contains(k)) {
            OsType::Windows
        } else if UNIX_KEYWORDS.iter().any(|k| lower.contains(k)) {
            OsType::Unix
        } else {
            OsType::Generic
        }
    }
}

/// Attack family / detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Simple,
    AbsolutePath,
    NonRecursive,
    UrlEncoding,
    PathValidation,
    NullByte,
    Any,
}

/// A concrete traversal string: raw bytes, not a `String`, so embedded NUL
/// bytes and invalid UTF-8 sequences survive unchanged.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn from_string(s: impl Into<String>) -> Self {
        Payload(s.into().into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view, for display/reporting only — never used to drive
    /// wire encoding.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload(s.into_bytes())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload(s.as_bytes().to_vec())
    }
}

/// Raw outcome of a single protocol round-trip, before classification.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub payload: Payload,
    pub endpoint_rendering: String,
    pub status: Option<u16>,
    pub body_preview: Vec<u8>,
    pub elapsed: Duration,
    pub error: Option<ProbeError>,
    /// TFTP-specific: the opcode received, when applicable (the oracle's
    /// opt-in "error code 2" rule needs this).
    pub tftp_error_code: Option<u16>,
}

impl ProbeOutcome {
    pub fn ok(
        payload: Payload,
        endpoint_rendering: String,
        status: Option<u16>,
        body_preview: Vec<u8>,
        elapsed: Duration,
    ) -> Self {
        ProbeOutcome {
            payload,
            endpoint_rendering,
            status,
            body_preview,
            elapsed,
            error: None,
            tftp_error_code: None,
        }
    }

    pub fn err(payload: Payload, endpoint_rendering: String, error: ProbeError) -> Self {
        ProbeOutcome {
            payload,
            endpoint_rendering,
            status: None,
            body_preview: Vec::new(),
            elapsed: Duration::ZERO,
            error: Some(error),
            tftp_error_code: None,
        }
    }
}

/// The oracle's verdict. The fourth implicit state, `filtered` (no
/// response), is always mapped to `Error` before this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Vulnerable,
    FalsePositive,
    Error,
}

/// Which protocol probe a scan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolModule {
    Http,
    HttpUrl,
    Ftp,
    Tftp,
    Payload,
    Stdout,
}

/// Post-hoc description of why a payload worked, ported from DotDotPwn's
/// `bisection_algorithm.py::analyze_traversal_pattern` (a supplemented
/// feature — see SPEC_FULL.md §10.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalAnalysis {
    pub estimated_depth: usize,
    pub pattern_type: String,
    pub encoding_used: Vec<String>,
    pub special_chars: Vec<char>,
}

/// A confirmed vulnerability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub payload: Payload,
    pub endpoint_rendering: String,
    pub matched_excerpt: Option<String>,
    pub status: Option<u16>,
    pub elapsed: Duration,
    /// Populated only when `ScanConfig::bisection` is set and the bisection
    /// search converges.
    pub bisected_depth: Option<u32>,
    pub analysis: Option<TraversalAnalysis>,
}

/// A captured per-payload error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub payload: Payload,
    pub endpoint_rendering: String,
    pub error: ProbeError,
}

/// A false-positive record: a successful response that didn't match the
/// configured `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalsePositive {
    pub payload: Payload,
    pub endpoint_rendering: String,
    pub status: Option<u16>,
}

/// The accumulated outcome of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub total_tests: usize,
    pub vulnerabilities: Vec<Vulnerability>,
    pub false_positives: Vec<FalsePositive>,
    pub errors: Vec<ErrorRecord>,
    pub duration: Duration,
    /// Supplemented feature (SPEC_FULL.md §10.5): the FTP greeting / HTTP
    /// `Server:` header, captured once per scan when available.
    pub server_banner: Option<String>,
}

/// Inputs to the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub protocol: ProtocolModule,
    pub endpoint: String,
    pub os: OsType,
    pub method: DetectionMethod,
    pub depth: u32,
    pub target_file: Option<String>,
    #[serde(default)]
    pub extra_files: bool,
    pub extension: Option<String>,
    pub pattern: Option<String>,
    #[serde(default)]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub delay: Duration,
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default)]
    pub break_on_first: bool,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default)]
    pub bisection: bool,
    #[serde(default)]
    pub ssl: bool,
    pub credentials: Option<Credentials>,
    pub payload_template: Option<String>,
    /// HTTP method for the `http`/`http_url` probes (GET, POST, HEAD, ...).
    #[serde(default = "default_http_method")]
    pub http_method: String,
    /// Bounded parallelism for HTTP probes (defaults to 10). Always clamped
    /// to 1 for FTP/TFTP regardless of this value.
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,
    /// Opt-in oracle rule: TFTP error code 2 (access violation) may count
    /// as vulnerable. Default `false`.
    #[serde(default)]
    pub tftp_error_code_2_is_vulnerable: bool,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_concurrency() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl ScanConfig {
    /// Validate the fields `run_scan` cannot safely proceed without: `depth`
    /// bounds plus the `http_url`/`payload` template checks. Fatal: returned
    /// before any I/O happens.
    pub fn validate(&self) -> Result<(), crate::error::FuzzError> {
        use crate::error::FuzzError;

        if self.depth < 1 || self.depth > 50 {
            return Err(FuzzError::InvalidConfig(format!(
                "depth must be in [1, 50], got {}",
                self.depth
            )));
        }

        if matches!(self.protocol, ProtocolModule::HttpUrl) {
            if !self.endpoint.contains("TRAVERSAL") {
                return Err(FuzzError::InvalidConfig(
                    "http-url mode requires the endpoint to contain the literal token TRAVERSAL"
                        .to_string(),
                ));
            }
            if self.pattern.is_none() {
                return Err(FuzzError::OracleUndecided);
            }
        }

        if matches!(self.protocol, ProtocolModule::Payload) {
            let template = self.payload_template.as_deref().unwrap_or_default();
            let occurrences = template.matches("TRAVERSAL").count();
            if occurrences == 0 {
                return Err(FuzzError::InvalidConfig(
                    "payload module requires a template containing TRAVERSAL".to_string(),
                ));
            }
            // More than one TRAVERSAL occurrence is not fatal, just logged by
            // the probe itself.
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_banner_detects_windows() {
        assert_eq!(OsType::from_os_banner("Microsoft Windows Server 2019"), OsType::Windows);
    }

    #[test]
    fn os_banner_detects_unix() {
        assert_eq!(OsType::from_os_banner("Linux 5.10"), OsType::Unix);
        assert_eq!(OsType::from_os_banner("FreeBSD 13.1"), OsType::Unix);
    }

    #[test]
    fn os_banner_defaults_to_generic() {
        assert_eq!(OsType::from_os_banner(""), OsType::Generic);
        assert_eq!(OsType::from_os_banner("Cisco IOS"), OsType::Generic);
    }

    #[test]
    fn payload_preserves_embedded_nul() {
        let p = Payload::from_string("a\0b");
        assert_eq!(p.as_bytes(), b"a\0b");
    }

    #[test]
    fn validate_rejects_depth_out_of_range() {
        let cfg = base_config();
        let mut bad = cfg.clone();
        bad.depth = 0;
        assert!(bad.validate().is_err());
        bad.depth = 51;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn validate_requires_traversal_token_for_http_url() {
        let mut cfg = base_config();
        cfg.protocol = ProtocolModule::HttpUrl;
        cfg.endpoint = "http://example.com/file".to_string();
        cfg.pattern = Some("root:".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_requires_pattern_for_http_url() {
        let mut cfg = base_config();
        cfg.protocol = ProtocolModule::HttpUrl;
        cfg.endpoint = "http://example.com/TRAVERSAL".to_string();
        cfg.pattern = None;
        assert!(matches!(cfg.validate(), Err(crate::error::FuzzError::OracleUndecided)));
    }

    fn base_config() -> ScanConfig {
        ScanConfig {
            protocol: ProtocolModule::Http,
            endpoint: "http://example.com".to_string(),
            os: OsType::Unix,
            method: DetectionMethod::Simple,
            depth: 3,
            target_file: None,
            extra_files: false,
            extension: None,
            pattern: None,
            user_agents: vec![],
            delay: Duration::from_millis(0),
            timeout: Duration::from_secs(10),
            break_on_first: false,
            continue_on_error: true,
            bisection: false,
            ssl: false,
            credentials: None,
            payload_template: None,
            http_method: "GET".to_string(),
            max_concurrency: 10,
            tftp_error_code_2_is_vulnerable: false,
        }
    }
}
