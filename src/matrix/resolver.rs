//! Supported base runtime resolution
//!
//! Determines which versions of a base runtime package (`r-base`, `mro-base`)
//! can be tested, given the dependency constraints that the companion packages
//! declare on it.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::{
    BASE_PACKAGE_CHANNEL, COMPANION_PACKAGES, MINIMUM_BASE_VERSION, MRO_SENTINEL,
    MRO_SENTINEL_VERSION, Platform,
};
use crate::version::constraint::satisfies;
use crate::version::error::IndexError;
use crate::version::key::{normalize, sort_versions};
use crate::version::registry::PackageIndex;
use crate::version::types::PackageRecord;

/// Resolves the supported versions of a base runtime family against a package index
pub struct MatrixResolver<I> {
    index: I,
    companions: Vec<String>,
}

impl<I: PackageIndex> MatrixResolver<I> {
    /// Create a resolver using the default companion packages
    pub fn new(index: I) -> Self {
        Self::with_companions(index, COMPANION_PACKAGES.iter().map(|p| p.to_string()))
    }

    /// Create a resolver checking a custom list of companion packages
    pub fn with_companions(index: I, companions: impl IntoIterator<Item = String>) -> Self {
        Self {
            index,
            companions: companions.into_iter().collect(),
        }
    }

    /// Get the package index
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Resolve the supported versions of `{family}-base`
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Supported versions, oldest first, without duplicates
    /// * `Err(IndexError)` - If any index query fails
    pub fn resolve(&self, platform: Platform, family: &str) -> Result<Vec<String>, IndexError> {
        let base_package = format!("{}-base", family);
        let floor = normalize(MINIMUM_BASE_VERSION);

        let records = self
            .index
            .search(platform, &format!("{}::{}", BASE_PACKAGE_CHANNEL, base_package))?;

        let mut supported: HashSet<String> = records
            .into_iter()
            .map(|record| record.version)
            .filter(|version| normalize(version) >= floor)
            .collect();

        if supported.is_empty() {
            info!("No {} versions at or above {}", base_package, MINIMUM_BASE_VERSION);
            return Ok(Vec::new());
        }

        for companion in &self.companions {
            let records = self.index.search(platform, companion)?;
            let constraints = base_constraints(&records, &base_package);

            supported.retain(|version| {
                let keep = satisfies(version, &constraints);
                if !keep {
                    debug!(
                        "Removing {} {} due to package {}",
                        base_package, version, companion
                    );
                }
                keep
            });
        }

        let mut versions: Vec<String> = supported.into_iter().collect();
        sort_versions(&mut versions);

        Ok(versions)
    }
}

/// Collect the constraints companion records place on the base package.
///
/// Only the first dependency naming the base package is considered per record;
/// the constraint is its last space-separated token. The bare `mro-base`
/// dependency stands for the single version the alternate distribution shipped.
pub fn base_constraints(records: &[PackageRecord], base_package: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.dependency_on(base_package))
        .map(|dependency| {
            if dependency == MRO_SENTINEL {
                format!("=={}", MRO_SENTINEL_VERSION)
            } else {
                dependency
                    .rsplit(' ')
                    .next()
                    .unwrap_or(dependency)
                    .to_string()
            }
        })
        .collect()
}
