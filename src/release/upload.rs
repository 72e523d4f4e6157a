//! Uploading local files to an existing release

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::release::error::ReleaseError;
use crate::release::git::{GitRepo, repo_slug};
use crate::release::github::GitHubClient;

const REMOTE: &str = "origin";

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(String),
    /// Replaced an asset of the same name (`force`)
    Replaced(String),
    /// An asset of the same name exists and `force` was not given
    Skipped(String),
}

fn asset_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Upload files to the release tagged `tag`.
///
/// Assets are named after the file name. An existing asset with the same
/// name is deleted first when `force` is set, and skipped otherwise.
pub async fn upload_assets<G: GitRepo + ?Sized>(
    git: &G,
    github: &GitHubClient,
    tag: &str,
    files: &[PathBuf],
    force: bool,
) -> Result<Vec<UploadOutcome>, ReleaseError> {
    let repo = repo_slug(&git.remote_url(REMOTE)?)?;

    let release = match github.release_by_tag(&repo, tag).await {
        Ok(Some(release)) => release,
        Ok(None) | Err(ReleaseError::Api { .. }) => {
            return Err(ReleaseError::ReleaseNotFound(tag.to_string()));
        }
        Err(e) => return Err(e),
    };

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let name = asset_name(path);
        let existing = release.assets.iter().find(|asset| asset.name == name);

        let replaced = match existing {
            Some(_) if !force => {
                warn!("Asset already exists: {}", name);
                outcomes.push(UploadOutcome::Skipped(name));
                continue;
            }
            Some(asset) => {
                github.delete_asset(&repo, asset).await?;
                true
            }
            None => false,
        };

        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| ReleaseError::Asset {
                path: path.clone(),
                source,
            })?;
        github.upload_asset(&release, &name, contents).await?;
        info!("Uploaded {} to {}", name, tag);

        outcomes.push(if replaced {
            UploadOutcome::Replaced(name)
        } else {
            UploadOutcome::Uploaded(name)
        });
    }

    Ok(outcomes)
}
