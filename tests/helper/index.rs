//! Package index test utilities

use std::cell::RefCell;
use std::collections::HashMap;

use cicd_tools::config::Platform;
use cicd_tools::version::error::IndexError;
use cicd_tools::version::registry::PackageIndex;
use cicd_tools::version::types::PackageRecord;

/// In-memory package index
#[derive(Default)]
pub struct FakeIndex {
    packages: HashMap<String, Vec<PackageRecord>>,
    failing: Option<String>,
    queries: RefCell<Vec<String>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register versions of a package that have no dependencies
    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        self.packages.insert(
            package.to_string(),
            versions
                .into_iter()
                .map(|v| PackageRecord::new(v, Vec::new()))
                .collect(),
        );
        self
    }

    /// Register records of a package as (version, dependencies)
    pub fn with_records(mut self, package: &str, records: Vec<(&str, Vec<&str>)>) -> Self {
        self.packages.insert(
            package.to_string(),
            records
                .into_iter()
                .map(|(version, depends)| {
                    PackageRecord::new(version, depends.into_iter().map(String::from).collect())
                })
                .collect(),
        );
        self
    }

    /// Make queries for `package` fail
    pub fn failing_on(mut self, package: &str) -> Self {
        self.failing = Some(package.to_string());
        self
    }

    /// Packages queried so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl PackageIndex for FakeIndex {
    fn search(&self, _platform: Platform, package: &str) -> Result<Vec<PackageRecord>, IndexError> {
        self.queries.borrow_mut().push(package.to_string());

        if self.failing.as_deref() == Some(package) {
            return Err(IndexError::QueryFailure {
                package: package.to_string(),
                payload: r#"{"exception_name": "CondaHTTPError"}"#.to_string(),
            });
        }

        Ok(self.packages.get(package).cloned().unwrap_or_default())
    }
}
