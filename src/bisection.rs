//! Bisection Engine (C6): binary search for the exact traversal depth once
//! a vulnerability has been found at some depth within `[lo, hi]`, plus the
//! post-hoc `analyze_traversal_pattern` classifier ported from DotDotPwn's
//! `BisectionAlgorithm.analyze_traversal_pattern`.

use std::time::Duration;

use async_trait::async_trait;

use crate::generator::{generate, GenerateParams};
use crate::types::{DetectionMethod, OsType, Payload, TraversalAnalysis};

/// Anything that can answer "does this single payload trigger the
/// vulnerability", used to keep the binary search transport-agnostic —
/// `driver::run_scan` supplies an implementation backed by a live `Probe`
/// plus the oracle.
#[async_trait]
pub trait BisectionTester: Send + Sync {
    async fn test_vulnerability(&self, payload: &Payload) -> bool;
}

#[derive(Debug, Clone)]
pub struct BisectionParams {
    pub os: OsType,
    pub target_file: Option<String>,
    pub extension: Option<String>,
    pub delay: Duration,
}

/// Binary search `[lo, hi]` for the smallest depth that reproduces the
/// vulnerability. At each midpoint, every payload `generate()` produces for
/// that exact depth (`bisection_depth: Some(mid)`) is tried in turn; any hit
/// narrows the search downward, any miss narrows it upward. Returns `None`
/// if nothing in the range reproduces.
pub async fn find_minimum_depth(
    tester: &dyn BisectionTester,
    lo: u32,
    hi: u32,
    params: &BisectionParams,
) -> Option<u32> {
    let mut left = lo;
    let mut right = hi;
    let mut exact_depth = None;

    while left <= right {
        let mid = left + (right - left) / 2;

        let gen_params = GenerateParams {
            os: params.os,
            depth: mid,
            method: DetectionMethod::Simple,
            target_file: params.target_file.clone(),
            extra_files: false,
            extension: params.extension.clone(),
            bisection_depth: Some(mid),
        };

        let payloads = match generate(&gen_params) {
            Ok(p) => p,
            Err(_) => break,
        };

        let mut vulnerable_at_mid = false;
        for payload in &payloads {
            if tester.test_vulnerability(payload).await {
                vulnerable_at_mid = true;
                exact_depth = Some(mid);
                break;
            }
            if params.delay > Duration::ZERO {
                tokio::time::sleep(params.delay).await;
            }
        }

        if vulnerable_at_mid {
            right = mid.saturating_sub(1);
        } else {
            left = mid + 1;
        }
    }

    exact_depth
}

const ENCODING_MARKERS: &[(&str, &str)] = &[
    ("%2f", "URL encoded forward slash"),
    ("%5c", "URL encoded backslash"),
    ("%2e", "URL encoded dot"),
    ("%00", "Null byte"),
    ("0x2f", "Hex encoded forward slash"),
    ("0x5c", "Hex encoded backslash"),
    ("%c0%af", "UTF-8 overlong encoding"),
    ("%252f", "Double URL encoded forward slash"),
];

const SPECIAL_CHARS: &[char] = &['?', '*', '<', '>', '|', ':', '"'];

/// Describe a vulnerable payload's depth, style, and encoding, for
/// `ScanResult.vulnerabilities[].analysis`. Pure string inspection, no
/// re-derivation from the generator's own bookkeeping — the rendering is
/// all that's left once a response has already come back.
pub fn analyze_traversal_pattern(rendered: &str) -> TraversalAnalysis {
    let unix_count = rendered.matches("../").count();
    let windows_count = rendered.matches("..\\").count();
    let estimated_depth = unix_count.max(windows_count);

    let lower = rendered.to_lowercase();
    let pattern_type = if rendered.contains("../") {
        "unix_style"
    } else if rendered.contains("..\\") {
        "windows_style"
    } else if lower.contains("%2f") {
        "url_encoded"
    } else if lower.contains("%5c") {
        "url_encoded_windows"
    } else {
        "unknown"
    };

    let encoding_used: Vec<String> = ENCODING_MARKERS
        .iter()
        .filter(|(marker, _)| lower.contains(marker))
        .map(|(_, description)| description.to_string())
        .collect();

    let special_chars: Vec<char> = SPECIAL_CHARS
        .iter()
        .copied()
        .filter(|c| rendered.contains(*c))
        .collect();

    TraversalAnalysis {
        estimated_depth,
        pattern_type: pattern_type.to_string(),
        encoding_used,
        special_chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedDepthTester {
        vulnerable_depth: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl BisectionTester for FixedDepthTester {
        async fn test_vulnerability(&self, payload: &Payload) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let rendered = payload.to_string_lossy();
            let depth = rendered.matches("../").count().max(rendered.matches("..\\").count());
            depth as u32 >= self.vulnerable_depth
        }
    }

    #[tokio::test]
    async fn finds_the_minimum_vulnerable_depth() {
        let tester = FixedDepthTester {
            vulnerable_depth: 4,
            calls: AtomicU32::new(0),
        };
        let params = BisectionParams {
            os: OsType::Unix,
            target_file: Some("/etc/passwd".to_string()),
            extension: None,
            delay: Duration::ZERO,
        };
        let found = find_minimum_depth(&tester, 1, 10, &params).await;
        assert_eq!(found, Some(4));
    }

    #[tokio::test]
    async fn returns_none_when_nothing_in_range_is_vulnerable() {
        let tester = FixedDepthTester {
            vulnerable_depth: 100,
            calls: AtomicU32::new(0),
        };
        let params = BisectionParams {
            os: OsType::Unix,
            target_file: Some("/etc/passwd".to_string()),
            extension: None,
            delay: Duration::ZERO,
        };
        let found = find_minimum_depth(&tester, 1, 6, &params).await;
        assert_eq!(found, None);
    }

    #[test]
    fn analyzes_unix_style_url_encoded_payload() {
        let analysis = analyze_traversal_pattern("../../../%2e%2e%2fetc/passwd%00.png");
        assert_eq!(analysis.estimated_depth, 3);
        assert_eq!(analysis.pattern_type, "unix_style");
        assert!(analysis.encoding_used.contains(&"URL encoded dot".to_string()));
        assert!(analysis.encoding_used.contains(&"Null byte".to_string()));
    }

    #[test]
    fn analyzes_windows_style_payload_with_special_chars() {
        let analysis = analyze_traversal_pattern("..\\..\\boot.ini?a=1");
        assert_eq!(analysis.pattern_type, "windows_style");
        assert!(analysis.special_chars.contains(&'?'));
    }
}
