//! Encoding helpers used while *generating* payloads (not detecting them).
//!
//! Repurposed from `path-security`'s per-concern function style: each
//! function here does one conversion and returns an owned `String`, chained
//! together by `generator`/`methods::*`.

/// Strip leading path separators from a target file before concatenating it
/// after a traversal prefix, so `"../" + "/etc/passwd"` doesn't become
/// `"..//etc/passwd"`.
pub fn strip_leading_separators(target_file: &str) -> &str {
    target_file.trim_start_matches(['/', '\\'])
}

/// Rewrite the separators *inside* a target file to match the encoding the
/// traversal prefix uses, so `"/etc/passwd"` following an URL-encoded prefix
/// becomes `"%2fetc%2fpasswd"` rather than leaking a literal `/`.
///
/// Mirrors the precedence DotDotPwn's `_adapt_file_slashes` uses: URL
/// encodings win over literal backslash, which wins over literal forward
/// slash.
pub fn adapt_file_separators(target_file: &str, traversal_prefix: &str) -> String {
    let prefix_lower = traversal_prefix.to_lowercase();
    if prefix_lower.contains("%2f") || prefix_lower.contains("%5c") {
        target_file.replace('/', "%2f").replace('\\', "%5c")
    } else if traversal_prefix.contains('\\') {
        target_file.replace('/', "\\")
    } else if traversal_prefix.contains('/') {
        target_file.replace('\\', "/")
    } else {
        target_file.to_string()
    }
}

/// Repeat a pattern `k` times.
pub fn repeat(pattern: &str, k: u32) -> String {
    pattern.repeat(k as usize)
}

/// The "overlap trick" non_recursive uses to look like a realistic path: the
/// pattern repeated `k` times, with the final repetition's first two bytes
/// dropped (`p p p[2:]`).
pub fn repeat_with_overlap(pattern: &str, k: u32) -> String {
    if k == 0 {
        return String::new();
    }
    if k == 1 {
        return pattern.to_string();
    }
    let mut out = pattern.repeat((k - 1) as usize);
    let tail: String = pattern.chars().skip(2).collect();
    out.push_str(&tail);
    out
}

/// Insert a dedup-preserving stable unique filter: first occurrence wins,
/// order preserved.
pub fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_separator_kinds() {
        assert_eq!(strip_leading_separators("/etc/passwd"), "etc/passwd");
        assert_eq!(strip_leading_separators("\\windows\\win.ini"), "windows\\win.ini");
        assert_eq!(strip_leading_separators("etc/passwd"), "etc/passwd");
    }

    #[test]
    fn adapts_to_url_encoded_prefix() {
        assert_eq!(adapt_file_separators("/etc/passwd", "..%2f"), "%2fetc%2fpasswd");
    }

    #[test]
    fn adapts_to_backslash_prefix() {
        assert_eq!(adapt_file_separators("/etc/passwd", "..\\"), "\\etc\\passwd");
    }

    #[test]
    fn adapts_to_forward_slash_prefix() {
        assert_eq!(adapt_file_separators("\\windows\\win.ini", "../"), "/windows/win.ini");
    }

    #[test]
    fn repeat_with_overlap_drops_leading_duplicate() {
        // "..%252f" * 3 with the overlap trick on the final repetition
        assert_eq!(
            repeat_with_overlap("..%252f", 3),
            "..%252f..%252f%252f"
        );
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let items = vec!["a".to_string(), "b".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(dedup_preserve_order(items), vec!["a", "b", "c"]);
    }
}
