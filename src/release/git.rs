//! Local git operations used while promoting a release

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

#[cfg(test)]
use mockall::automock;
use regex::Regex;
use tracing::debug;

use crate::release::error::ReleaseError;

/// Matches `owner/repo` in SSH and HTTPS GitHub remotes
static GITHUB_REMOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com[/:](.+?)(?:\.git)?/?$").unwrap());

/// Trait for the git operations release promotion needs
#[cfg_attr(test, automock)]
pub trait GitRepo {
    /// `git fetch --tags`
    fn fetch_tags(&self) -> Result<(), ReleaseError>;

    /// `git checkout <branch>`
    fn checkout(&self, branch: &str) -> Result<(), ReleaseError>;

    /// Commit sha a reference points to (`git rev-list -n 1 <reference>`)
    fn commit_sha(&self, reference: &str) -> Result<String, ReleaseError>;

    /// URL of a remote (`git remote get-url <remote>`)
    fn remote_url(&self, remote: &str) -> Result<String, ReleaseError>;

    /// `git tag <tag> <sha>`
    fn create_tag(&self, tag: &str, sha: &str) -> Result<(), ReleaseError>;

    /// `git push`
    fn push(&self) -> Result<(), ReleaseError>;

    /// `git push <remote> <refspec>`
    fn push_refspec(&self, remote: &str, refspec: &str) -> Result<(), ReleaseError>;

    /// Names of all local tags
    fn tags(&self) -> Result<Vec<String>, ReleaseError>;

    /// `git tag -d <tag>`
    fn delete_tag(&self, tag: &str) -> Result<(), ReleaseError>;
}

/// Git backend running the system `git` binary
pub struct SystemGit {
    work_dir: PathBuf,
}

impl SystemGit {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
        }
    }

    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.work_dir);
        cmd
    }

    /// Run git and return its trimmed stdout
    fn run(&self, args: &[&str]) -> Result<String, ReleaseError> {
        let command = args.join(" ");
        debug!("Running git {}", command);

        let output = self
            .git_cmd()
            .args(args)
            .output()
            .map_err(|e| ReleaseError::Git {
                command: command.clone(),
                message: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            return Err(ReleaseError::Git {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitRepo for SystemGit {
    fn fetch_tags(&self) -> Result<(), ReleaseError> {
        self.run(&["fetch", "--tags"]).map(drop)
    }

    fn checkout(&self, branch: &str) -> Result<(), ReleaseError> {
        self.run(&["checkout", branch]).map(drop)
    }

    fn commit_sha(&self, reference: &str) -> Result<String, ReleaseError> {
        self.run(&["rev-list", "-n", "1", reference])
    }

    fn remote_url(&self, remote: &str) -> Result<String, ReleaseError> {
        self.run(&["remote", "get-url", remote])
    }

    fn create_tag(&self, tag: &str, sha: &str) -> Result<(), ReleaseError> {
        self.run(&["tag", tag, sha]).map(drop)
    }

    fn push(&self) -> Result<(), ReleaseError> {
        self.run(&["push"]).map(drop)
    }

    fn push_refspec(&self, remote: &str, refspec: &str) -> Result<(), ReleaseError> {
        self.run(&["push", remote, refspec]).map(drop)
    }

    fn tags(&self) -> Result<Vec<String>, ReleaseError> {
        // show-ref exits with 1 and prints nothing when there are no tags
        let output = self
            .git_cmd()
            .args(["show-ref", "--tags"])
            .output()
            .map_err(|e| ReleaseError::Git {
                command: "show-ref --tags".to_string(),
                message: format!("failed to run git: {}", e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let no_tags = output.status.code() == Some(1) && stdout.trim().is_empty();
        if !output.status.success() && !no_tags {
            return Err(ReleaseError::Git {
                command: "show-ref --tags".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_show_ref(&stdout))
    }

    fn delete_tag(&self, tag: &str) -> Result<(), ReleaseError> {
        self.run(&["tag", "-d", tag]).map(drop)
    }
}

/// Extract tag names from `git show-ref --tags` output
pub fn parse_show_ref(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/tags/"))
        .map(str::to_string)
        .collect()
}

/// Extract `owner/repo` from a GitHub remote URL
pub fn repo_slug(remote_url: &str) -> Result<String, ReleaseError> {
    GITHUB_REMOTE_RE
        .captures(remote_url.trim())
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| ReleaseError::UnrecognizedRemote(remote_url.to_string()))
}
