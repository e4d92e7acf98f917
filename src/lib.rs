//! # dotpath-fuzz
//!
//! A directory-traversal vulnerability fuzzer: a combinatorial payload
//! generator plus an async HTTP/FTP/TFTP/raw-socket fuzzing pipeline.
//!
//! ## Pieces
//!
//! - [`constants`] / [`encoding`] — the dot/slash encoding catalogs and the
//!   string helpers the generator composes them with.
//! - [`generator`] / [`methods`] — `generate()`, one function per attack
//!   family (simple, absolute-path, non-recursive, URL-encoding,
//!   path-validation, null-byte, and the combined `any`).
//! - [`oracle`] — classifies a probe's response as vulnerable, a false
//!   positive, or an error.
//! - [`probes`] — one transport per protocol (HTTP, HTTP-URL-template, FTP,
//!   TFTP, a templated raw socket, and a stdout pass-through).
//! - [`driver`] — `run_scan`, the bounded-concurrency orchestrator tying the
//!   above together.
//! - [`bisection`] — binary search for the exact vulnerable depth once one
//!   is found.
//!
//! ## Usage
//!
//! ```no_run
//! use dotpath_fuzz::{generate, GenerateParams, OsType, DetectionMethod};
//!
//! let mut params = GenerateParams::new(OsType::Unix, 6, DetectionMethod::Simple);
//! params.target_file = Some("/etc/passwd".to_string());
//! let payloads = generate(&params)?;
//! assert!(!payloads.is_empty());
//! # Ok::<(), dotpath_fuzz::FuzzError>(())
//! ```

pub mod bisection;
pub mod cli;
pub mod constants;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod logging;
pub mod methods;
pub mod oracle;
pub mod probes;
pub mod types;

pub use bisection::{analyze_traversal_pattern, find_minimum_depth, BisectionParams, BisectionTester};
pub use driver::{run_scan, ProgressCallback};
pub use error::{FuzzError, ProbeError};
pub use generator::{generate, GenerateParams};
pub use oracle::{classify, excerpt, ClassifyResult};
pub use types::{
    Classification, Credentials, DetectionMethod, ErrorRecord, FalsePositive, OsType, Payload,
    ProbeOutcome, ProtocolModule, ScanConfig, ScanResult, TraversalAnalysis, Vulnerability,
};