//! Protocol preference from an R package `DESCRIPTION` file
//!
//! Packages bundling the TK client libraries declare them with a
//! `TKVersion: <version>` field; those can talk the binary `cas` protocol.
//! Without the field, or with `TKVersion: none`, only `http` is available.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::server::banner::ProtocolPreference;
use crate::server::error::ServerInfoError;

static TK_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TKVersion\s*:\s*(\S+)").unwrap());

const DESCRIPTION_FILE: &str = "DESCRIPTION";

/// The bundled TK version, if any. Only the first `TKVersion` line counts.
pub fn tk_version(description: &str) -> Option<&str> {
    description
        .lines()
        .find_map(|line| TK_VERSION_RE.captures(line))
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str())
        .filter(|version| *version != "none")
}

/// Read `DESCRIPTION` under `package_root` and derive the protocol preference
pub fn package_preference(package_root: &Path) -> Result<ProtocolPreference, ServerInfoError> {
    let path = package_root.join(DESCRIPTION_FILE);
    let description = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ServerInfoError::DescriptionNotFound(path.clone())
        } else {
            ServerInfoError::Read {
                path: path.clone(),
                source,
            }
        }
    })?;

    let version = tk_version(&description);
    debug!("TKVersion in {}: {:?}", path.display(), version);

    Ok(ProtocolPreference::RequiresTk(version.is_some()))
}
