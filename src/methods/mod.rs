//! One module per `DetectionMethod` variant. Each module
//! exposes a single `generate(&GenerateParams) -> Vec<String>` that the
//! generator dispatches to; none of these functions deduplicate or validate
//! their input, that's the generator's job.

pub mod absolute_path;
pub mod any;
pub mod non_recursive;
pub mod null_byte;
pub mod path_validation;
pub mod simple;
pub mod url_encoding;

use crate::constants::{DOTS, SLASHES};
use crate::encoding::{adapt_file_separators, repeat, strip_leading_separators};
use crate::generator::GenerateParams;

/// Plain `../`, `..\`, `./`, `.\` traversal sequences for depths `1..=depth`
/// (or the single bisection depth), one per prefix style. Shared by `simple`,
/// `path_validation`, and `null_byte`.
pub(crate) fn basic_traversal_sequences(params: &GenerateParams) -> Vec<String> {
    let mut out = Vec::new();
    for sep in ["../", "..\\", "./", ".\\"] {
        for depth in params.depth_range() {
            out.push(repeat(sep, depth));
        }
    }
    out
}

/// Append a target file to a traversal sequence, adapting the file's
/// internal separators and appending an optional extension.
pub(crate) fn with_target(prefix: &str, target: &str, extension: Option<&str>) -> String {
    let stripped = strip_leading_separators(target);
    let adapted = adapt_file_separators(stripped, prefix);
    let mut combined = format!("{prefix}{adapted}");
    if let Some(ext) = extension {
        combined.push_str(ext);
    }
    combined
}

/// URL-encoded subset of `DOTS`: entries whose literal form is itself percent
/// (or unicode-percent) encoded, used by `url_encoding` and the validation/
/// null-byte families' "add a URL-encoded variant" step.
pub(crate) fn url_encoded_dots() -> Vec<&'static str> {
    DOTS.iter().copied().filter(|d| d.starts_with('%')).collect()
}

/// URL-encoded subset of `SLASHES`, same rule as `url_encoded_dots`.
pub(crate) fn url_encoded_slashes() -> Vec<&'static str> {
    SLASHES.iter().copied().filter(|s| s.starts_with('%')).collect()
}
