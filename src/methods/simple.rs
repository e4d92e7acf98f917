//! `simple`: plain `../` and `..\` traversal sequences at every depth from 1
//! up to the configured depth, crossed with the relative target-file list.
//! The baseline method; every other method either restricts or enriches it.

use crate::generator::{relative_target_files, GenerateParams};
use crate::methods::{basic_traversal_sequences, with_target};

pub fn generate(params: &GenerateParams) -> Vec<String> {
    let prefixes = basic_traversal_sequences(params);
    let targets = relative_target_files(params);
    let mut out = Vec::with_capacity(prefixes.len() * targets.len());
    for prefix in &prefixes {
        for target in &targets {
            out.push(with_target(prefix, target, params.extension.as_deref()));
        }
    }
    out
}
