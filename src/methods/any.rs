//! `any`: the full combinatorial pipeline. Runs the entire `DOTS x SLASHES`
//! cross product (not just the URL-encoded subset `url_encoding` restricts
//! to) plus the hand-authored special patterns, then folds in every other
//! method's output so a single `any` run is a superset of a scan run once
//! per individual method.

use crate::constants::SPECIAL_PATTERNS;
use crate::constants::{DOTS, SLASHES};
use crate::generator::{relative_target_files, GenerateParams};
use crate::methods::{self, with_target};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let targets = relative_target_files(params);
    let mut out = Vec::new();

    for dot in DOTS {
        for slash in SLASHES {
            let base = format!("{dot}{slash}");
            for depth in params.depth_range() {
                let prefix = base.repeat(depth as usize);
                for target in &targets {
                    out.push(with_target(&prefix, target, params.extension.as_deref()));
                }
            }
        }
    }

    for pattern in SPECIAL_PATTERNS {
        for depth in params.depth_range() {
            let prefix = pattern.repeat(depth as usize);
            for target in &targets {
                out.push(with_target(&prefix, target, params.extension.as_deref()));
            }
        }
    }

    out.extend(methods::simple::generate(params));
    out.extend(methods::non_recursive::generate(params));
    out.extend(methods::url_encoding::generate(params));

    // The expensive families are skipped in bisection mode:
    // bisection only needs simple/url-encoded/non-recursive variants at a
    // single fixed depth, and null/absolute/path-validation multiply the
    // cost of every bisection probe for no benefit to the binary search.
    if params.bisection_depth.is_none() {
        out.extend(methods::path_validation::generate(params));
        out.extend(methods::null_byte::generate(params));
        out.extend(methods::absolute_path::generate(params));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectionMethod, OsType};

    #[test]
    fn depth_one_contains_the_overlong_utf8_prefix() {
        let mut params = GenerateParams::new(OsType::Unix, 1, DetectionMethod::Any);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params);
        assert!(out.iter().any(|p| p.starts_with("%c0%ae%c0%ae")));
    }

    #[test]
    fn is_a_superset_of_simple() {
        let mut params = GenerateParams::new(OsType::Unix, 2, DetectionMethod::Any);
        params.target_file = Some("/etc/passwd".to_string());
        let any_out = generate(&params);
        let simple_out = methods::simple::generate(&params);
        for item in &simple_out {
            assert!(any_out.contains(item));
        }
    }

    #[test]
    fn scale_at_depth_six_exceeds_one_thousand() {
        let mut params = GenerateParams::new(OsType::Unix, 6, DetectionMethod::Any);
        params.target_file = Some("/etc/passwd".to_string());
        let out = crate::generator::generate(&params).unwrap();
        assert!(out.len() > 1000, "got {} payloads", out.len());
    }

    #[test]
    fn bisection_mode_skips_the_expensive_families() {
        let mut params = GenerateParams::new(OsType::Unix, 6, DetectionMethod::Any);
        params.target_file = Some("/etc/passwd".to_string());
        params.bisection_depth = Some(3);
        let out = generate(&params);
        assert!(!out.iter().any(|p| p.contains("%00")));
    }
}
