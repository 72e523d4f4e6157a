//! Package index trait for querying published package versions

#[cfg(test)]
use mockall::automock;

use crate::config::Platform;
use crate::version::error::IndexError;
use crate::version::types::PackageRecord;

/// Trait for listing the published versions of a package
#[cfg_attr(test, automock)]
pub trait PackageIndex {
    /// Lists every published version of a package for a platform
    ///
    /// # Arguments
    /// * `platform` - Target platform of the packages
    /// * `package` - Package identifier, optionally channel-qualified (e.g. "r::r-base")
    ///
    /// # Returns
    /// * `Ok(Vec<PackageRecord>)` - All records, empty if the package does not exist
    /// * `Err(IndexError)` - If the query fails for any other reason
    fn search(&self, platform: Platform, package: &str) -> Result<Vec<PackageRecord>, IndexError>;
}
