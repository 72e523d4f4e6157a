//! Normalized version keys
//!
//! Conda versions are compared on a `(major, minor, patch)` triple. Anything
//! from an alpha marker onward is dropped and missing components count as zero,
//! so `"3.4a0"` and `"3.4"` both become `(3, 4, 0)`.

use std::cmp::Ordering;
use std::fmt;

/// Comparable form of a version string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Normalize a version string into a [`Version`].
///
/// Never fails: digit runs are scanned out of whatever text remains after the
/// pre-release marker, and a string without digits yields `0.0.0`.
///
/// Examples:
/// - "2.3.1" -> (2, 3, 1)
/// - "3.4a0" -> (3, 4, 0)
/// - "1.0" -> (1, 0, 0)
pub fn normalize(version: &str) -> Version {
    let release = version.split('a').next().unwrap_or_default();

    let mut parts = release
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<u64>().unwrap_or(u64::MAX));

    Version {
        major: parts.next().unwrap_or(0),
        minor: parts.next().unwrap_or(0),
        patch: parts.next().unwrap_or(0),
    }
}

/// Order two raw version strings by their normalized form.
///
/// Ties (e.g. "3.5" and "3.5.0") fall back to the raw text so that sorting is total.
pub fn compare(a: &str, b: &str) -> Ordering {
    normalize(a).cmp(&normalize(b)).then_with(|| a.cmp(b))
}

/// Sort raw version strings oldest first and drop exact duplicates
pub fn sort_versions(versions: &mut Vec<String>) {
    versions.sort_by(|a, b| compare(a, b));
    versions.dedup();
}
