//! `cicd upload-assets`: attach files to an existing release

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cicd_tools::config::GitHubConfig;
use cicd_tools::release::git::SystemGit;
use cicd_tools::release::github::GitHubClient;
use cicd_tools::release::upload::{UploadOutcome, upload_assets};

pub async fn run(
    config: &GitHubConfig,
    work_dir: &Path,
    tag: &str,
    files: &[PathBuf],
    force: bool,
) -> Result<()> {
    let git = SystemGit::new(work_dir);
    let github = GitHubClient::new(config).context("failed to create GitHub client")?;

    let outcomes = upload_assets(&git, &github, tag, files, force)
        .await
        .with_context(|| format!("failed to upload assets to {}", tag))?;

    for outcome in outcomes {
        match outcome {
            UploadOutcome::Uploaded(name) | UploadOutcome::Replaced(name) => println!("{}", name),
            UploadOutcome::Skipped(name) => eprintln!("WARNING: Asset already exists: {}", name),
        }
    }

    Ok(())
}
