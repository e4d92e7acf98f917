//! Traversal payload generator: `generate()`.
//!
//! Pure, deterministic, no I/O. Dispatches to one function per
//! `DetectionMethod` in `crate::methods`, then deduplicates (set semantics,
//! first-occurrence order preserved) and wraps the result as `Payload`.

use std::ops::RangeInclusive;

use crate::constants::*;
use crate::encoding::dedup_preserve_order;
use crate::error::FuzzError;
use crate::methods;
use crate::types::{DetectionMethod, OsType, Payload};

/// Named parameter bundle for `generate()`, used instead of a long
/// positional parameter list.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub os: OsType,
    pub depth: u32,
    pub method: DetectionMethod,
    pub target_file: Option<String>,
    pub extra_files: bool,
    pub extension: Option<String>,
    pub bisection_depth: Option<u32>,
}

impl GenerateParams {
    pub fn new(os: OsType, depth: u32, method: DetectionMethod) -> Self {
        GenerateParams {
            os,
            depth,
            method,
            target_file: None,
            extra_files: false,
            extension: None,
            bisection_depth: None,
        }
    }

    pub fn depth_range(&self) -> RangeInclusive<u32> {
        match self.bisection_depth {
            Some(k) => k..=k,
            None => 1..=self.depth,
        }
    }

    fn validate(&self) -> Result<(), FuzzError> {
        if self.depth < 1 || self.depth > 50 {
            return Err(FuzzError::InvalidConfig(format!(
                "depth must be in [1, 50], got {}",
                self.depth
            )));
        }
        if let Some(k) = self.bisection_depth {
            if k < 1 || k > 50 {
                return Err(FuzzError::InvalidConfig(format!(
                    "bisection_depth must be in [1, 50], got {k}"
                )));
            }
        }
        Ok(())
    }
}

/// Relative target files for the `simple`/`url_encoding`/`non_recursive`/
/// `null_byte` families.
pub fn relative_target_files(params: &GenerateParams) -> Vec<String> {
    if let Some(file) = &params.target_file {
        return vec![file.clone()];
    }
    let mut files: Vec<String> = match params.os {
        OsType::Windows => FILES_WINDOWS.iter().map(|s| s.to_string()).collect(),
        OsType::Unix => FILES_UNIX.iter().map(|s| s.to_string()).collect(),
        OsType::Generic => FILES_WINDOWS
            .iter()
            .chain(FILES_UNIX.iter())
            .map(|s| s.to_string())
            .collect(),
    };
    if params.extra_files {
        files.extend(EXTRA_FILES.iter().map(|s| s.to_string()));
    }
    files
}

/// Absolute target files for the `absolute_path` family.
pub fn absolute_target_files(params: &GenerateParams) -> Vec<String> {
    if let Some(file) = &params.target_file {
        return vec![file.clone()];
    }
    match params.os {
        OsType::Windows => ABS_FILES_WINDOWS.iter().map(|s| s.to_string()).collect(),
        OsType::Unix => ABS_FILES_UNIX.iter().map(|s| s.to_string()).collect(),
        OsType::Generic => ABS_FILES_WINDOWS
            .iter()
            .chain(ABS_FILES_UNIX.iter())
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Legitimate prefixes for the `path_validation` family.
pub fn prefixes_for_os(os: OsType) -> Vec<&'static str> {
    match os {
        OsType::Windows => PREFIXES_WINDOWS.to_vec(),
        OsType::Unix => PREFIXES_UNIX.to_vec(),
        OsType::Generic => PREFIXES_WINDOWS
            .iter()
            .chain(PREFIXES_UNIX.iter())
            .copied()
            .collect(),
    }
}

/// `generate(os, depth, method, target_file?, extra_files, extension?,
/// bisection_depth?) -> sequence<string>`.
pub fn generate(params: &GenerateParams) -> Result<Vec<Payload>, FuzzError> {
    params.validate()?;

    if params
        .target_file
        .as_deref()
        .map(str::is_empty)
        .unwrap_or(false)
    {
        return Err(FuzzError::InvalidConfig(
            "target_file cannot resolve to an empty byte sequence".to_string(),
        ));
    }

    let raw: Vec<String> = match params.method {
        DetectionMethod::Simple => methods::simple::generate(params),
        DetectionMethod::AbsolutePath => methods::absolute_path::generate(params),
        DetectionMethod::NonRecursive => methods::non_recursive::generate(params),
        DetectionMethod::UrlEncoding => methods::url_encoding::generate(params),
        DetectionMethod::PathValidation => methods::path_validation::generate(params),
        DetectionMethod::NullByte => methods::null_byte::generate(params),
        DetectionMethod::Any => methods::any::generate(params),
    };

    let deduped = dedup_preserve_order(raw);

    if deduped.is_empty() {
        return Err(FuzzError::InvalidConfig(
            "generator produced zero payloads for the given configuration".to_string(),
        ));
    }

    Ok(deduped.into_iter().map(Payload::from_string).collect())
}
