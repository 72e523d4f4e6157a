//! Promotion of a release candidate to a final release

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::release::error::ReleaseError;
use crate::release::git::{GitRepo, repo_slug};
use crate::release::github::{GitHubClient, NewRelease, Release};

static RC_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+-rc$").unwrap());

static RC_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(v\d+\.\d+\.\d+)-rc").unwrap());

const MAIN_BRANCH: &str = "main";
const REMOTE: &str = "origin";

/// A release candidate tag of the form `vX.Y.Z-rc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcTag(String);

impl RcTag {
    pub fn parse(tag: &str) -> Result<Self, ReleaseError> {
        if RC_TAG_RE.is_match(tag) {
            Ok(Self(tag.to_string()))
        } else {
            Err(ReleaseError::InvalidTag(tag.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag of the final release: `v1.7.0-rc` -> `v1.7.0`
    pub fn release_tag(&self) -> String {
        self.0.trim_end_matches("-rc").to_string()
    }

    /// Tag of the development snapshot: `v1.7.0-rc` -> `v1.7.0-snapshot`
    pub fn snapshot_tag(&self) -> String {
        format!("{}-snapshot", self.release_tag())
    }
}

impl FromStr for RcTag {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RcTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drop the `-rc` suffix from every `vX.Y.Z-rc` in a release name or body
pub fn strip_rc(text: &str) -> String {
    RC_VERSION_RE.replace_all(text, "$1").into_owned()
}

/// Find the local tag whose last path component is `tag`
pub fn find_local_tag<'a>(tags: &'a [String], tag: &str) -> Option<&'a str> {
    tags.iter()
        .map(String::as_str)
        .find(|name| name.rsplit('/').next() == Some(tag))
}

/// Promote a release candidate.
///
/// Tags the candidate's commit with the final version, creates the final
/// release with the candidate's name, body and assets, then removes the
/// candidate and snapshot releases along with their tags.
pub async fn promote<G: GitRepo + ?Sized>(
    git: &G,
    github: &GitHubClient,
    rc_tag: &RcTag,
) -> Result<Release, ReleaseError> {
    git.fetch_tags()?;
    git.checkout(MAIN_BRANCH)?;

    let release_tag = rc_tag.release_tag();
    let release_sha = git.commit_sha(rc_tag.as_str())?;
    let repo = repo_slug(&git.remote_url(REMOTE)?)?;
    info!("Promoting {} ({}) in {}", rc_tag, release_sha, repo);

    let rc_release = match github.release_by_tag(&repo, rc_tag.as_str()).await {
        Ok(Some(release)) => release,
        Ok(None) | Err(ReleaseError::Api { .. }) => {
            return Err(ReleaseError::ReleaseNotFound(rc_tag.to_string()));
        }
        Err(e) => return Err(e),
    };

    git.create_tag(&release_tag, &release_sha)?;
    git.push()?;
    git.push_refspec(REMOTE, &release_tag)?;

    let new_release = NewRelease {
        tag_name: release_tag.clone(),
        target_commitish: release_sha,
        name: strip_rc(rc_release.name.as_deref().unwrap_or_default()),
        body: strip_rc(rc_release.body.as_deref().unwrap_or_default()),
        draft: false,
        prerelease: false,
    };
    let release = github.create_release(&repo, &new_release).await?;
    info!("Created release {}", release_tag);

    for asset in &rc_release.assets {
        info!("Copying asset {}", asset.name);
        let contents = github.download_asset(asset).await?;
        github.upload_asset(&release, &asset.name, contents).await?;
    }

    delete_release(git, github, &repo, rc_tag.as_str()).await?;
    delete_release(git, github, &repo, &rc_tag.snapshot_tag()).await?;

    Ok(release)
}

/// Remove a release and its tag, locally and on the remote.
///
/// A missing release or tag is skipped.
async fn delete_release<G: GitRepo + ?Sized>(
    git: &G,
    github: &GitHubClient,
    repo: &str,
    tag: &str,
) -> Result<(), ReleaseError> {
    match github.release_by_tag(repo, tag).await {
        Ok(Some(release)) => {
            if let Err(e) = github.delete_release(&release).await {
                warn!("Failed to delete release {}: {}", tag, e);
            } else {
                info!("Deleted release {}", tag);
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to look up release {}: {}", tag, e),
    }

    let tags = git.tags()?;
    if let Some(local_tag) = find_local_tag(&tags, tag) {
        git.delete_tag(local_tag)?;
        git.push_refspec(REMOTE, &format!(":refs/tags/{}", local_tag))?;
        info!("Deleted tag {}", local_tag);
    }

    Ok(())
}
