//! `cicd promote`: turn a release candidate into a final release

use std::path::Path;

use anyhow::{Context, Result};
use cicd_tools::config::GitHubConfig;
use cicd_tools::release::git::SystemGit;
use cicd_tools::release::github::GitHubClient;
use cicd_tools::release::promote::{RcTag, promote};
use tracing::info;

pub async fn run(config: &GitHubConfig, work_dir: &Path, tag: &RcTag) -> Result<()> {
    let git = SystemGit::new(work_dir);
    let github = GitHubClient::new(config).context("failed to create GitHub client")?;

    let release = promote(&git, &github, tag)
        .await
        .with_context(|| format!("failed to promote {}", tag))?;

    info!("Published {}", release.tag_name);
    println!("{}", release.tag_name);

    Ok(())
}
