//! Checksum manifests in the `sha1sum` line format.
//!
//! Each line is `<hex digest><space><mode><path>` where the mode character is
//! a space for text mode or `*` for binary mode. Blank lines and lines
//! starting with `#` are ignored.

use crate::algorithm::{Algorithm, Checksum};
use crate::{Error, Result};

/// One line of a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Hex digest exactly as written in the manifest.
    pub digest: String,
    /// Path the digest applies to.
    pub path: String,
    /// Whether the line used binary mode (`*`).
    pub binary: bool,
    /// 1-based line number in the manifest.
    pub line: usize,
}

impl ManifestEntry {
    /// The algorithm implied by the digest length, if any.
    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::from_hex_len(self.digest.len())
    }

    /// Whether `actual` matches the recorded digest, ignoring case.
    pub fn matches(&self, actual: &Checksum) -> bool {
        actual.eq_hex(&self.digest)
    }
}

/// Parse a single manifest line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(text: &str, line: usize) -> Result<Option<ManifestEntry>> {
    let text = text.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if text.trim().is_empty() || text.trim_start().starts_with('#') {
        return Ok(None);
    }

    let malformed = |reason: &str| Error::MalformedManifestLine {
        line,
        reason: reason.to_string(),
    };

    let (digest, rest) = text
        .split_once(' ')
        .ok_or_else(|| malformed("missing separator after digest"))?;

    if digest.is_empty() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed("digest is not hexadecimal"));
    }

    let (binary, path) = match rest.as_bytes().first() {
        Some(b' ') => (false, &rest[1..]),
        Some(b'*') => (true, &rest[1..]),
        _ => return Err(malformed("expected ' ' or '*' before path")),
    };

    if path.is_empty() {
        return Err(malformed("missing path"));
    }

    Ok(Some(ManifestEntry {
        digest: digest.to_string(),
        path: path.to_string(),
        binary,
        line,
    }))
}

/// Parse a whole manifest, stopping at the first malformed line.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line, index + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Format one manifest line in text mode.
pub fn format_line(checksum: &Checksum, path: &str) -> String {
    format!("{}  {}", checksum, path)
}
