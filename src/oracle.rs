//! Oracle (C3): turns a raw `ProbeOutcome` into a `Classification`.
//!
//! A pure, total function: every reachable `ProbeOutcome` maps to exactly
//! one of `Vulnerable`, `FalsePositive`, or `Error`, no fourth silent state.
//! Connection failures are handled upstream by the probes (they populate
//! `ProbeOutcome.error` instead of `status`), so this function only has to
//! reason about a completed round-trip. `Error` is reserved for transport
//! failures (rule 1); any other completed round-trip that doesn't satisfy
//! the success gate or the pattern is a `FalsePositive`, never silently
//! dropped.

use crate::types::{Classification, ProbeOutcome, ProtocolModule};

/// The oracle's full verdict: the bucket a payload belongs in, plus (when
/// classification came from a pattern match) the byte range of the first
/// match in `ProbeOutcome.body_preview`, so the driver can slice the
/// surrounding excerpt without re-running the search itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyResult {
    pub classification: Classification,
    pub matched_range: Option<(usize, usize)>,
}

impl ClassifyResult {
    fn plain(classification: Classification) -> Self {
        ClassifyResult { classification, matched_range: None }
    }
}

/// Classify one probe outcome against the configured success pattern.
///
/// `pattern` is required (and enforced at config-validation time) for
/// `http_url`; for plain `http`/`payload`/`stdout` probing it is optional,
/// and its absence falls back to a status-code-only heuristic.
pub fn classify(
    outcome: &ProbeOutcome,
    pattern: Option<&str>,
    protocol: ProtocolModule,
    tftp_error_code_2_is_vulnerable: bool,
) -> ClassifyResult {
    if outcome.error.is_some() {
        return ClassifyResult::plain(Classification::Error);
    }

    match protocol {
        ProtocolModule::Ftp => ClassifyResult::plain(classify_ftp(outcome)),
        ProtocolModule::Tftp => {
            ClassifyResult::plain(classify_tftp(outcome, tftp_error_code_2_is_vulnerable))
        }
        ProtocolModule::Http | ProtocolModule::HttpUrl => classify_http_like(outcome, pattern),
        ProtocolModule::Payload | ProtocolModule::Stdout => classify_raw_like(outcome, pattern),
    }
}

fn classify_http_like(outcome: &ProbeOutcome, pattern: Option<&str>) -> ClassifyResult {
    match outcome.status {
        Some(status) if (200..300).contains(&status) => {
            classify_by_pattern(&outcome.body_preview, pattern)
        }
        // Any other completed status (4xx, 5xx, redirects, ...) failed the
        // success gate but is still a completed round-trip, not a transport
        // failure — §4.3 rule 5.
        Some(_) => ClassifyResult::plain(Classification::FalsePositive),
        None => ClassifyResult::plain(Classification::Error),
    }
}

/// Templated raw-socket / stdout protocols carry no status code at all, so
/// the only signal is whether a response came back and whether it matches
/// the configured `pattern`.
fn classify_raw_like(outcome: &ProbeOutcome, pattern: Option<&str>) -> ClassifyResult {
    if outcome.body_preview.is_empty() {
        return ClassifyResult::plain(Classification::Error);
    }
    classify_by_pattern(&outcome.body_preview, pattern)
}

fn classify_by_pattern(body: &[u8], pattern: Option<&str>) -> ClassifyResult {
    match pattern {
        Some(p) if !p.is_empty() => match find_match(body, p) {
            Some(range) => ClassifyResult {
                classification: Classification::Vulnerable,
                matched_range: Some(range),
            },
            None => ClassifyResult::plain(Classification::FalsePositive),
        },
        _ => ClassifyResult::plain(Classification::Vulnerable),
    }
}

/// Byte offsets `(start, end)` of the first occurrence of `pattern` in
/// `body`, or `None` if it doesn't occur.
fn find_match(body: &[u8], pattern: &str) -> Option<(usize, usize)> {
    let needle = pattern.as_bytes();
    if needle.is_empty() || needle.len() > body.len() {
        return None;
    }
    let start = body.windows(needle.len()).position(|w| w == needle)?;
    Some((start, start + needle.len()))
}

/// The ±50-byte excerpt around a matched range, decoded lossy, per §4.3
/// rule 4. Clamped to the body's bounds on both sides.
pub fn excerpt(body: &[u8], matched_range: (usize, usize)) -> String {
    const MARGIN: usize = 50;
    let (start, end) = matched_range;
    let window_start = start.saturating_sub(MARGIN);
    let window_end = end.saturating_add(MARGIN).min(body.len());
    String::from_utf8_lossy(&body[window_start..window_end]).into_owned()
}

/// FTP reply codes: 1xx/2xx on a `RETR`-style read mean the file streamed
/// back; `550` is "file unavailable" (not found or denied).
fn classify_ftp(outcome: &ProbeOutcome) -> Classification {
    match outcome.status {
        Some(code) if (100..300).contains(&code) => Classification::Vulnerable,
        Some(_) => Classification::FalsePositive,
        None => Classification::Error,
    }
}

/// TFTP opcodes/error codes: a `DATA` packet (opcode 3) means the file
/// transferred. An `ERROR` packet's error code distinguishes "not found"
/// (1, always a false positive) from "access violation" (2, false positive
/// unless the opt-in rule treats it as vulnerable).
fn classify_tftp(outcome: &ProbeOutcome, error_code_2_is_vulnerable: bool) -> Classification {
    const OPCODE_DATA: u16 = 3;
    const OPCODE_ERROR: u16 = 5;

    match (outcome.status, outcome.tftp_error_code) {
        (Some(OPCODE_DATA), _) => Classification::Vulnerable,
        (Some(OPCODE_ERROR), Some(1)) => Classification::FalsePositive,
        (Some(OPCODE_ERROR), Some(2)) if error_code_2_is_vulnerable => Classification::Vulnerable,
        (Some(OPCODE_ERROR), Some(2)) => Classification::FalsePositive,
        (Some(OPCODE_ERROR), _) => Classification::Error,
        _ => Classification::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;
    use std::time::Duration;

    fn outcome(status: Option<u16>, body: &[u8]) -> ProbeOutcome {
        ProbeOutcome::ok(
            Payload::from_string("../../../etc/passwd"),
            "http://x/../../../etc/passwd".to_string(),
            status,
            body.to_vec(),
            Duration::from_millis(5),
        )
    }

    #[test]
    fn http_200_with_matching_pattern_is_vulnerable() {
        let o = outcome(Some(200), b"root:x:0:0:root:/root:/bin/bash");
        let result = classify(&o, Some("root:"), ProtocolModule::Http, false);
        assert_eq!(result.classification, Classification::Vulnerable);
        assert_eq!(result.matched_range, Some((0, 5)));
    }

    #[test]
    fn http_200_without_matching_pattern_is_false_positive() {
        let o = outcome(Some(200), b"<html>nothing here</html>");
        assert_eq!(
            classify(&o, Some("root:"), ProtocolModule::Http, false).classification,
            Classification::FalsePositive
        );
    }

    #[test]
    fn http_200_with_no_pattern_configured_is_vulnerable() {
        let o = outcome(Some(200), b"irrelevant");
        assert_eq!(
            classify(&o, None, ProtocolModule::Http, false).classification,
            Classification::Vulnerable
        );
    }

    #[test]
    fn http_404_is_false_positive() {
        let o = outcome(Some(404), b"not found");
        assert_eq!(
            classify(&o, Some("root:"), ProtocolModule::Http, false).classification,
            Classification::FalsePositive
        );
    }

    /// A completed-but-unsuccessful round trip (5xx, redirects, ...) is a
    /// `FalsePositive`, not an `Error` — the latter is reserved for
    /// transport failures that never got a response at all. See
    /// §4.3 rule 5.
    #[test]
    fn http_500_is_false_positive_not_error() {
        let o = outcome(Some(500), b"boom");
        assert_eq!(
            classify(&o, Some("root:"), ProtocolModule::Http, false).classification,
            Classification::FalsePositive
        );
    }

    #[test]
    fn probe_error_always_classifies_as_error() {
        use crate::error::ProbeError;
        let o = ProbeOutcome::err(
            Payload::from_string("x"),
            "x".to_string(),
            ProbeError::Timeout,
        );
        assert_eq!(
            classify(&o, Some("root:"), ProtocolModule::Http, false).classification,
            Classification::Error
        );
    }

    #[test]
    fn tftp_error_code_2_is_gated_by_the_opt_in_flag() {
        let mut o = outcome(Some(5), b"");
        o.tftp_error_code = Some(2);
        assert_eq!(
            classify(&o, None, ProtocolModule::Tftp, false).classification,
            Classification::FalsePositive
        );
        assert_eq!(
            classify(&o, None, ProtocolModule::Tftp, true).classification,
            Classification::Vulnerable
        );
    }

    #[test]
    fn tftp_data_opcode_is_vulnerable() {
        let o = outcome(Some(3), b"file bytes");
        assert_eq!(
            classify(&o, None, ProtocolModule::Tftp, false).classification,
            Classification::Vulnerable
        );
    }

    #[test]
    fn ftp_226_transfer_complete_is_vulnerable() {
        let o = outcome(Some(226), b"");
        assert_eq!(
            classify(&o, None, ProtocolModule::Ftp, false).classification,
            Classification::Vulnerable
        );
    }

    #[test]
    fn ftp_550_is_false_positive() {
        let o = outcome(Some(550), b"");
        assert_eq!(
            classify(&o, None, ProtocolModule::Ftp, false).classification,
            Classification::FalsePositive
        );
    }

    #[test]
    fn excerpt_is_clamped_to_fifty_bytes_each_side() {
        let body = vec![b'a'; 200];
        let mut body = body;
        body[100..105].copy_from_slice(b"root:");
        let text = excerpt(&body, (100, 105));
        assert_eq!(text.len(), 50 + 5 + 50);
    }

    #[test]
    fn excerpt_clamps_at_body_boundaries() {
        let body = b"root:x:0:0:root:/root:/bin/bash";
        let text = excerpt(body, (0, 5));
        assert_eq!(text, String::from_utf8_lossy(body));
    }
}
