//! `url_encoding`: the `DOTS x SLASHES` cross product restricted to entries
//! that are themselves percent- (or unicode-percent-) encoded, repeated
//! across every configured depth. Narrower than `any`, which also walks the
//! literal/special-pattern families.

use crate::generator::{relative_target_files, GenerateParams};
use crate::methods::{url_encoded_dots, url_encoded_slashes, with_target};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let dots = url_encoded_dots();
    let slashes = url_encoded_slashes();
    let targets = relative_target_files(params);
    let mut out = Vec::with_capacity(dots.len() * slashes.len() * targets.len());

    for dot in &dots {
        for slash in &slashes {
            let base = format!("{dot}{slash}");
            for depth in params.depth_range() {
                let prefix = base.repeat(depth as usize);
                for target in &targets {
                    out.push(with_target(&prefix, target, params.extension.as_deref()));
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
    fn only_percent_encoded_components_are_used() {
        let mut params = GenerateParams::new(OsType::Unix, 1, DetectionMethod::UrlEncoding);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params);
        assert!(!out.iter().any(|p| p.starts_with("../")));
        assert!(out.iter().any(|p| p.starts_with("%2e%2e%2f")));
    }
}
