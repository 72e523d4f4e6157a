//! Conda package index, queried through `conda search --json`

use std::collections::HashMap;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::config::{DEFAULT_CONDA_EXE, Platform};
use crate::version::error::IndexError;
use crate::version::registry::PackageIndex;
use crate::version::types::{PackageRecord, unqualified_name};

/// `exception_name` conda reports when a package has no builds for the platform
const PACKAGES_NOT_FOUND: &str = "PackagesNotFoundError";

/// Error body printed by `conda search --json` on failure
#[derive(Debug, Deserialize)]
struct CondaErrorBody {
    #[serde(default)]
    exception_name: Option<String>,
}

/// Package index backed by the conda command line
pub struct CondaIndex {
    executable: String,
}

impl Default for CondaIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CONDA_EXE)
    }
}

impl CondaIndex {
    /// Creates a CondaIndex that runs the given conda executable
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
        }
    }
}

impl PackageIndex for CondaIndex {
    fn search(&self, platform: Platform, package: &str) -> Result<Vec<PackageRecord>, IndexError> {
        debug!(
            "Running {} search --json --platform {} {}",
            self.executable, platform, package
        );

        let output = Command::new(&self.executable)
            .args(["search", "--json", "--platform", platform.as_str(), package])
            .output()
            .map_err(|source| IndexError::Spawn {
                command: self.executable.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(IndexError::QueryFailure {
                package: package.to_string(),
                payload: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let records = parse_search_output(package, output.status.success(), &stdout)?;
        debug!("Found {} records for package {}", records.len(), package);

        Ok(records)
    }
}

/// Interpret the JSON printed by `conda search --json`.
///
/// A successful search maps unqualified package names to their records. A
/// failed search prints an error body; `PackagesNotFoundError` means the
/// package has no versions and yields an empty list.
pub fn parse_search_output(
    package: &str,
    success: bool,
    stdout: &str,
) -> Result<Vec<PackageRecord>, IndexError> {
    let invalid = |source| IndexError::InvalidResponse {
        package: package.to_string(),
        source,
    };

    if !success {
        let body: CondaErrorBody = serde_json::from_str(stdout).map_err(invalid)?;
        if body.exception_name.as_deref() == Some(PACKAGES_NOT_FOUND) {
            debug!("Package {} not found", package);
            return Ok(Vec::new());
        }
        return Err(IndexError::QueryFailure {
            package: package.to_string(),
            payload: stdout.trim().to_string(),
        });
    }

    let mut by_name: HashMap<String, serde_json::Value> =
        serde_json::from_str(stdout).map_err(invalid)?;

    match by_name.remove(unqualified_name(package)) {
        Some(records) => serde_json::from_value(records).map_err(invalid),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_search_output_returns_records_for_unqualified_name() {
        let stdout = r#"{
            "r-base": [
                {"version": "3.5.1", "build": "h1", "depends": ["libgcc-ng >=7.2.0"]},
                {"version": "3.6.0", "build": "h2", "depends": []}
            ]
        }"#;

        let records = parse_search_output("r::r-base", true, stdout).unwrap();

        assert_eq!(
            records,
            vec![
                PackageRecord::new("3.5.1", vec!["libgcc-ng >=7.2.0".to_string()]),
                PackageRecord::new("3.6.0", vec![]),
            ]
        );
    }

    #[test]
    fn parse_search_output_returns_empty_when_name_missing() {
        let stdout = r#"{"r-base-dev": [{"version": "1.0"}]}"#;

        let records = parse_search_output("r::r-base", true, stdout).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn parse_search_output_treats_packages_not_found_as_empty() {
        let stdout = r#"{
            "caused_by": "None",
            "error": "PackagesNotFoundError: The following packages are not available",
            "exception_name": "PackagesNotFoundError",
            "exception_type": "<class 'conda.exceptions.PackagesNotFoundError'>"
        }"#;

        let records = parse_search_output("r::mro-base", false, stdout).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn parse_search_output_fails_for_other_errors() {
        let stdout = r#"{
            "error": "CondaHTTPError: HTTP 000 CONNECTION FAILED",
            "exception_name": "CondaHTTPError"
        }"#;

        let result = parse_search_output("r::r-base", false, stdout);

        match result {
            Err(IndexError::QueryFailure { package, payload }) => {
                assert_eq!(package, "r::r-base");
                assert!(payload.contains("CondaHTTPError"));
            }
            other => panic!("expected QueryFailure, got {:?}", other),
        }
    }

    #[test]
    fn parse_search_output_fails_for_invalid_json() {
        let result = parse_search_output("r::r-base", true, "not json");

        assert!(matches!(result, Err(IndexError::InvalidResponse { .. })));
    }

    #[test]
    fn search_fails_when_executable_is_missing() {
        let index = CondaIndex::new("/nonexistent/bin/conda");

        let result = index.search(Platform::Linux64, "r::r-base");

        assert!(matches!(result, Err(IndexError::Spawn { .. })));
    }

    /// Install a shell script standing in for conda
    #[cfg(unix)]
    fn fake_conda(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("conda");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn search_passes_platform_and_package() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let conda = fake_conda(
            temp_dir.path(),
            r#"[ "$*" = "search --json --platform osx-64 r::r-base" ] || exit 3
echo '{"r-base": [{"version": "3.6.1", "depends": []}]}'"#,
        );

        let records = CondaIndex::new(&conda)
            .search(Platform::Osx64, "r::r-base")
            .unwrap();

        assert_eq!(records, vec![PackageRecord::new("3.6.1", vec![])]);
    }

    #[cfg(unix)]
    #[test]
    fn search_fails_with_stderr_when_stdout_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let conda = fake_conda(temp_dir.path(), "echo 'channel unreachable' >&2\nexit 1");

        let result = CondaIndex::new(&conda).search(Platform::Linux64, "r::r-base");

        match result {
            Err(IndexError::QueryFailure { package, payload }) => {
                assert_eq!(package, "r::r-base");
                assert_eq!(payload, "channel unreachable");
            }
            other => panic!("expected QueryFailure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn search_returns_empty_when_package_not_found() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let conda = fake_conda(
            temp_dir.path(),
            r#"echo '{"exception_name": "PackagesNotFoundError"}'
exit 1"#,
        );

        let records = CondaIndex::new(&conda)
            .search(Platform::Linux64, "r::mro-base")
            .unwrap();

        assert!(records.is_empty());
    }
}
