//! Remote server process lookup

use std::path::Path;
use std::process::Command;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::server::error::ServerInfoError;

/// Trait for listing the processes running on a host
#[cfg_attr(test, automock)]
pub trait ProcessLister {
    /// Returns the output of `ps ax` on the given host
    fn list_processes(&self, host: &str) -> Result<String, ServerInfoError>;
}

/// Lists processes over ssh
#[derive(Debug, Default)]
pub struct SshProcessLister {
    login_name: Option<String>,
}

impl SshProcessLister {
    pub fn new(login_name: Option<String>) -> Self {
        Self { login_name }
    }

    fn command(&self, host: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.args([
            "-x",
            "-o",
            "StrictHostKeyChecking=no",
            "-o",
            "UserKnownHostsFile=/dev/null",
        ]);
        if let Some(login_name) = &self.login_name {
            cmd.arg("-l").arg(login_name);
        }
        cmd.args([host, "ps", "ax"]);
        cmd
    }
}

impl ProcessLister for SshProcessLister {
    fn list_processes(&self, host: &str) -> Result<String, ServerInfoError> {
        debug!("Listing processes on {}", host);

        let output = self
            .command(host)
            .output()
            .map_err(|e| ServerInfoError::PidLookup {
                host: host.to_string(),
                message: format!("failed to run ssh: {}", e),
            })?;

        if !output.status.success() {
            return Err(ServerInfoError::PidLookup {
                host: host.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The `-display` key of a server: the log file name without its extension
pub fn display_key(log_file: &Path) -> String {
    log_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find the pid of the first process whose command line mentions `key`
pub fn find_pid(ps_output: &str, key: &str) -> Option<String> {
    ps_output
        .lines()
        .filter(|line| line.contains(key) && !line.contains("grep"))
        .find_map(|line| line.split_whitespace().next())
        .map(str::to_string)
}

/// Look up the pid of the server identified by `key` on `host`
pub fn lookup_pid<L: ProcessLister + ?Sized>(
    lister: &L,
    host: &str,
    key: &str,
) -> Result<String, ServerInfoError> {
    let ps_output = lister.list_processes(host)?;

    find_pid(&ps_output, key).ok_or_else(|| ServerInfoError::PidLookup {
        host: host.to_string(),
        message: format!("no process matching '{}'", key),
    })
}
