//! Server connection discovery from its log
//!
//! A test server is started in the background with `-display <key>` and its
//! log written to `<key>.log`. Once the server is listening, its log contains a
//! banner with the host and ports; from that we derive the shell variables the
//! test suite connects with, and the pid used to shut the server down later.

pub mod banner;
pub mod description;
pub mod error;
pub mod pid;

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::server::banner::ServerBanner;
use crate::server::error::ServerInfoError;

/// Poll the log until the listening banner shows up.
///
/// Sleeps `interval` before each of the `retries` reads.
pub fn wait_for_banner(
    log_file: &Path,
    retries: u32,
    interval: Duration,
) -> Result<ServerBanner, ServerInfoError> {
    if !log_file.is_file() {
        return Err(ServerInfoError::LogNotFound(log_file.to_path_buf()));
    }

    for attempt in 1..=retries {
        thread::sleep(interval);

        let log = fs::read_to_string(log_file).map_err(|source| ServerInfoError::Read {
            path: log_file.to_path_buf(),
            source,
        })?;

        if let Some(banner) = ServerBanner::parse(&log) {
            debug!(
                "Found server banner for {} on attempt {}",
                banner.hostname, attempt
            );
            return Ok(banner);
        }
        debug!("Server banner not found (attempt {}/{})", attempt, retries);
    }

    Err(ServerInfoError::ServerNotReady {
        path: log_file.to_path_buf(),
        attempts: retries,
    })
}

/// Write the server pid to a file
pub fn write_pid_file(path: &Path, pid: &str) -> Result<(), ServerInfoError> {
    fs::write(path, pid).map_err(|source| ServerInfoError::PidFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BANNER_LINE: &str =
        "=== Server ready on cashost.example.com:5570 (binary) and http://cashost.example.com:8777 ===\n";

    #[test]
    fn wait_for_banner_fails_for_missing_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("missing.log");

        let result = wait_for_banner(&log_file, 3, Duration::ZERO);

        assert!(matches!(result, Err(ServerInfoError::LogNotFound(_))));
    }

    #[test]
    fn wait_for_banner_returns_banner_from_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cas-ci.log");
        fs::write(&log_file, format!("NOTE: starting\n{}", BANNER_LINE)).unwrap();

        let banner = wait_for_banner(&log_file, 3, Duration::ZERO).unwrap();

        assert_eq!(banner.hostname, "cashost.example.com");
        assert_eq!(banner.binary_port, 5570);
        assert_eq!(banner.http_port, 8777);
    }

    #[test]
    fn wait_for_banner_gives_up_after_retries() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cas-ci.log");
        fs::write(&log_file, "NOTE: starting\n").unwrap();

        let result = wait_for_banner(&log_file, 2, Duration::ZERO);

        assert!(matches!(
            result,
            Err(ServerInfoError::ServerNotReady { attempts: 2, .. })
        ));
    }

    #[test]
    fn wait_for_banner_picks_up_banner_written_while_polling() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cas-ci.log");
        fs::write(&log_file, "NOTE: starting\n").unwrap();

        let writer_path = log_file.clone();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            fs::write(&writer_path, BANNER_LINE).unwrap();
        });

        let banner = wait_for_banner(&log_file, 50, Duration::from_millis(20)).unwrap();
        writer.join().unwrap();

        assert_eq!(banner.hostname, "cashost.example.com");
    }

    #[test]
    fn write_pid_file_writes_pid() {
        let temp_dir = TempDir::new().unwrap();
        let pid_file = temp_dir.path().join("cas.pid");

        write_pid_file(&pid_file, "4711").unwrap();

        assert_eq!(fs::read_to_string(pid_file).unwrap(), "4711");
    }
}
