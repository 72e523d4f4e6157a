//! Common types for package index queries

use serde::Deserialize;

/// One published version of a package, as reported by the index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRecord {
    pub version: String,
    /// Raw dependency strings, either `"{name}"` or `"{name} {constraint}"`
    #[serde(default)]
    pub depends: Vec<String>,
}

impl PackageRecord {
    pub fn new(version: impl Into<String>, depends: Vec<String>) -> Self {
        Self {
            version: version.into(),
            depends,
        }
    }

    /// Returns the first dependency entry naming `package`
    pub fn dependency_on(&self, package: &str) -> Option<&str> {
        self.depends
            .iter()
            .map(String::as_str)
            .find(|dep| dep.split_whitespace().next() == Some(package))
    }
}

/// Strip the channel qualifier from a package identifier (`r::r-base` -> `r-base`)
pub fn unqualified_name(package: &str) -> &str {
    package.rsplit("::").next().unwrap_or(package)
}
