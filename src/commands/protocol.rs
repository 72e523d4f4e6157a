//! `cicd protocol`: print the protocol a package's tests should use

use std::path::Path;

use cicd_tools::server::description::package_preference;
use cicd_tools::server::error::ServerInfoError;

/// `cas` when the package bundles TK, `http` otherwise
pub fn run(package_root: &Path) -> Result<&'static str, ServerInfoError> {
    let preference = package_preference(package_root)?;
    Ok(if preference.protocol() == Some("cas") {
        "cas"
    } else {
        "http"
    })
}
