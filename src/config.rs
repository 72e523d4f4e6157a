use std::fmt;

// =============================================================================
// Test matrix constants
// =============================================================================

/// Oldest base runtime version that is still tested
pub const MINIMUM_BASE_VERSION: &str = "3.4.3";

/// Channel-qualified packages whose dependency on the base runtime limits the matrix
pub const COMPANION_PACKAGES: [&str; 3] = ["r::r-httr", "r::r-jsonlite", "r::r-testthat"];

/// Channel the base runtime packages are queried from
pub const BASE_PACKAGE_CHANNEL: &str = "r";

/// Dependency string of the alternate distribution that carries no version
pub const MRO_SENTINEL: &str = "mro-base";

/// The only version the bare `mro-base` dependency stands for
pub const MRO_SENTINEL_VERSION: &str = "3.4.3";

/// Base runtime families a matrix is built for
pub const DEFAULT_FAMILIES: [&str; 2] = ["r", "mro"];

/// Default driver environment the generated environments inherit from
pub const DEFAULT_DRIVER: &str = "conda";

/// Default conda executable
pub const DEFAULT_CONDA_EXE: &str = "conda";

// =============================================================================
// Server log polling
// =============================================================================

/// Number of times the server log is read before giving up
pub const DEFAULT_LOG_RETRIES: u32 = 5;

/// Seconds to wait before each read of the server log
pub const DEFAULT_LOG_INTERVAL_SECS: u64 = 3;

// =============================================================================
// GitHub
// =============================================================================

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable holding the GitHub API token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the GitHub API base URL
pub const GITHUB_API_URL_VAR: &str = "GITHUB_API_URL";

/// Conda platform a matrix is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Platform {
    #[value(name = "linux-64")]
    Linux64,
    #[value(name = "osx-64")]
    Osx64,
    #[value(name = "win-64")]
    Win64,
    #[value(name = "linux-ppc64le")]
    LinuxPpc64le,
}

impl Platform {
    /// Returns the conda name of the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux64 => "linux-64",
            Platform::Osx64 => "osx-64",
            Platform::Win64 => "win-64",
            Platform::LinuxPpc64le => "linux-ppc64le",
        }
    }

    /// Detect the platform of the running host
    pub fn detect() -> Option<Self> {
        detect_from(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn detect_from(os: &str, arch: &str) -> Option<Platform> {
    match os {
        "macos" => Some(Platform::Osx64),
        "windows" => Some(Platform::Win64),
        "linux" if arch.starts_with("x86") => Some(Platform::Linux64),
        "linux" if arch.starts_with("powerpc") => Some(Platform::LinuxPpc64le),
        _ => None,
    }
}

/// Credentials and endpoint for the GitHub REST API
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl GitHubConfig {
    /// Read the configuration from the process environment.
    /// Returns None when `GITHUB_TOKEN` is unset or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let token = lookup(GITHUB_TOKEN_VAR).filter(|t| !t.trim().is_empty())?;
        let api_url = lookup(GITHUB_API_URL_VAR)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        Some(Self {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}
