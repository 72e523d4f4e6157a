//! `cicd server-info`: print connection variables for a running test server

use std::path::Path;
use std::time::Duration;

use cicd_tools::server::banner::{ProtocolPreference, connection_variables, format_variables};
use cicd_tools::server::description::package_preference;
use cicd_tools::server::error::ServerInfoError;
use cicd_tools::server::pid::{ProcessLister, display_key, lookup_pid};
use cicd_tools::server::{wait_for_banner, write_pid_file};
use tracing::info;

/// Environment overrides win; otherwise ask the package, when one is given
pub fn resolve_preference(
    from_env: ProtocolPreference,
    package_root: Option<&Path>,
) -> Result<ProtocolPreference, ServerInfoError> {
    match (from_env, package_root) {
        (ProtocolPreference::Unset, Some(root)) => package_preference(root),
        (preference, _) => Ok(preference),
    }
}

/// Wait for the server banner, look up the server pid and return the
/// `KEY=VALUE` line to print.
pub fn run<L: ProcessLister + ?Sized>(
    log_file: &Path,
    pid_file: Option<&Path>,
    retries: u32,
    interval: Duration,
    lister: &L,
    preference: &ProtocolPreference,
) -> Result<String, ServerInfoError> {
    let banner = wait_for_banner(log_file, retries, interval)?;
    info!(
        "Server listening on {} (binary {}, http {})",
        banner.hostname, banner.binary_port, banner.http_port
    );

    let mut vars = connection_variables(&banner, preference);

    let pid = lookup_pid(lister, &banner.hostname, &display_key(log_file))?;
    if let Some(pid_file) = pid_file {
        write_pid_file(pid_file, &pid)?;
    }
    vars.push(("CAS_PID", pid));

    Ok(format_variables(&vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct StaticLister(&'static str);

    impl ProcessLister for StaticLister {
        fn list_processes(&self, _host: &str) -> Result<String, ServerInfoError> {
            Ok(self.0.to_string())
        }
    }

    const LOG: &str = "NOTE: === SAS Cloud Analytic Services server ready on \
                       cashost:5570 (binary) and http://cashost:8777 ===\n";

    const PS_OUTPUT: &str = "  PID TTY STAT TIME COMMAND\n 4711 ? Sl 1:12 cas -display cas-ci\n";

    #[test]
    fn run_prints_variables_and_writes_pid_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cas-ci.log");
        let pid_file = temp_dir.path().join("cas.pid");
        fs::write(&log_file, LOG).unwrap();

        let line = run(
            &log_file,
            Some(&pid_file),
            1,
            Duration::ZERO,
            &StaticLister(PS_OUTPUT),
            &ProtocolPreference::RequiresTk(false),
        )
        .unwrap();

        assert_eq!(
            line,
            "CASHOST=cashost CAS_HOST=cashost CAS_BINARY_PORT=5570 CAS_HTTP_PORT=8777 \
             CAS_BINARY_URL=cas://cashost:5570 CAS_HTTP_URL=http://cashost:8777 \
             CASPROTOCOL=http CAS_PROTOCOL=http CASPORT=8777 CAS_PORT=8777 \
             CASURL=http://cashost:8777 CAS_URL=http://cashost:8777 CAS_PID=4711"
        );
        assert_eq!(fs::read_to_string(pid_file).unwrap(), "4711");
    }

    #[test]
    fn resolve_preference_falls_back_to_package_description() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("DESCRIPTION"), "TKVersion: vb21020\n").unwrap();

        let preference =
            resolve_preference(ProtocolPreference::Unset, Some(temp_dir.path())).unwrap();

        assert_eq!(preference, ProtocolPreference::RequiresTk(true));
    }

    #[test]
    fn resolve_preference_keeps_environment_override() {
        let temp_dir = TempDir::new().unwrap();

        let preference = resolve_preference(
            ProtocolPreference::Explicit("https".to_string()),
            Some(temp_dir.path()),
        )
        .unwrap();

        assert_eq!(preference, ProtocolPreference::Explicit("https".to_string()));
    }

    #[test]
    fn run_fails_when_server_process_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cas-other.log");
        fs::write(&log_file, LOG).unwrap();

        let result = run(
            &log_file,
            None,
            1,
            Duration::ZERO,
            &StaticLister(PS_OUTPUT),
            &ProtocolPreference::Unset,
        );

        assert!(matches!(result, Err(ServerInfoError::PidLookup { .. })));
    }
}
