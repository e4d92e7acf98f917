//! Property-based tests for the traversal payload generator.
//!
//! Covers the quantified properties of determinism, uniqueness, and
//! monotonicity in depth.
//!
//! Run: cargo test --test generator_properties

use dotpath_fuzz::{generate, DetectionMethod, GenerateParams, OsType};
use proptest::prelude::*;

fn arb_os() -> impl Strategy<Value = OsType> {
    prop_oneof![Just(OsType::Windows), Just(OsType::Unix), Just(OsType::Generic)]
}

fn arb_depth_bearing_method() -> impl Strategy<Value = DetectionMethod> {
    prop_oneof![Just(DetectionMethod::Simple), Just(DetectionMethod::UrlEncoding)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Determinism: two calls with the same configuration produce the same
    /// ordered sequence.
    #[test]
    fn prop_generate_is_deterministic(os in arb_os(), depth in 1u32..12, method in arb_depth_bearing_method()) {
        let mut params = GenerateParams::new(os, depth, method);
        params.target_file = Some("/etc/passwd".to_string());
        let first = generate(&params).unwrap();
        let second = generate(&params).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Uniqueness: no duplicate payloads in the output.
    #[test]
    fn prop_generate_has_no_duplicates(os in arb_os(), depth in 1u32..12, method in arb_depth_bearing_method()) {
        let mut params = GenerateParams::new(os, depth, method);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params).unwrap();
        let mut rendered: Vec<String> = out.iter().map(|p| p.to_string_lossy()).collect();
        let before = rendered.len();
        rendered.sort();
        rendered.dedup();
        prop_assert_eq!(rendered.len(), before);
    }

    /// Monotone in depth: `generate(depth=d+1)` is a superset of
    /// `generate(depth=d)` for simple/url_encoding.
    #[test]
    fn prop_generate_is_monotone_in_depth(os in arb_os(), depth in 1u32..10, method in arb_depth_bearing_method()) {
        let mut params = GenerateParams::new(os, depth, method);
        params.target_file = Some("/etc/passwd".to_string());
        let smaller = generate(&params).unwrap();

        params.depth = depth + 1;
        let larger = generate(&params).unwrap();

        let larger_set: std::collections::HashSet<_> =
            larger.iter().map(|p| p.to_string_lossy()).collect();
        for payload in &smaller {
            prop_assert!(larger_set.contains(&payload.to_string_lossy()));
        }
    }

    /// Target-file normalization: a leading-separator target file never
    /// produces a doubled separator in the target portion of the payload.
    #[test]
    fn prop_leading_separator_target_is_normalized(os in arb_os(), depth in 1u32..6) {
        let mut params = GenerateParams::new(os, depth, DetectionMethod::Simple);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params).unwrap();
        for payload in &out {
            let rendered = payload.to_string_lossy();
            // After the traversal prefix's own slashes, the target segment
            // "etc/passwd" should appear without a doubled leading slash.
            prop_assert!(!rendered.contains("//etc"));
            prop_assert!(!rendered.contains("\\\\etc"));
        }
    }
}

#[test]
fn scale_any_unix_depth_six_etc_passwd_exceeds_one_thousand() {
    let mut params = GenerateParams::new(OsType::Unix, 6, DetectionMethod::Any);
    params.target_file = Some("/etc/passwd".to_string());
    let out = generate(&params).unwrap();
    assert!(out.len() > 1000, "expected > 1000 payloads, got {}", out.len());
}

#[test]
fn round_trip_through_lines_reproduces_the_sequence() {
    let mut params = GenerateParams::new(OsType::Unix, 4, DetectionMethod::Simple);
    params.target_file = Some("/etc/passwd".to_string());
    let out = generate(&params).unwrap();

    let serialized = out.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>().join("\n");
    let read_back: Vec<String> = serialized.lines().map(|l| l.to_string()).collect();

    let rendered: Vec<String> = out.iter().map(|p| p.to_string_lossy()).collect();
    assert_eq!(rendered, read_back);
}
