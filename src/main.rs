use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cicd_tools::config::{
    DEFAULT_CONDA_EXE, DEFAULT_DRIVER, DEFAULT_LOG_INTERVAL_SECS, DEFAULT_LOG_RETRIES,
    GitHubConfig, Platform,
};
use cicd_tools::release::error::ReleaseError;
use cicd_tools::release::promote::RcTag;
use cicd_tools::server::banner::ProtocolPreference;
use cicd_tools::server::pid::SshProcessLister;

mod commands;

#[derive(Parser)]
#[command(name = "cicd")]
#[command(version, about = "CI and release automation utilities")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate tox configurations testing the supported runtime versions
    ToxIni {
        /// Template tox.ini
        ini_file: PathBuf,

        /// Conda platform to query (defaults to the host platform)
        #[arg(short, long, value_enum)]
        platform: Option<Platform>,

        /// Output directory (defaults to the template's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Driver environment the generated environments inherit from
        #[arg(long = "driver", default_value = DEFAULT_DRIVER)]
        drivers: Vec<String>,

        /// conda executable
        #[arg(long, default_value = DEFAULT_CONDA_EXE)]
        conda: String,
    },

    /// Print connection variables for a test server started in the background
    ServerInfo {
        /// Server log file; its name without extension is the server's -display key
        #[arg(value_name = "LOG_FILE")]
        server_log: PathBuf,

        /// Login name used to ssh to the server host
        #[arg(short, long)]
        login_name: Option<String>,

        /// Write the server pid to this file
        #[arg(short, long)]
        pid_file: Option<PathBuf>,

        /// Number of times to read the log
        #[arg(short, long, default_value_t = DEFAULT_LOG_RETRIES)]
        retries: u32,

        /// Seconds to wait before each read
        #[arg(short, long, default_value_t = DEFAULT_LOG_INTERVAL_SECS)]
        interval: u64,

        /// Package whose DESCRIPTION decides the protocol when the environment does not
        #[arg(long, value_name = "DIR")]
        package_root: Option<PathBuf>,
    },

    /// Print the protocol (cas or http) a package's tests should use
    Protocol {
        /// Package root containing DESCRIPTION
        #[arg(default_value = ".")]
        package_root: PathBuf,
    },

    /// Promote a release candidate (vX.Y.Z-rc) to a final release
    Promote {
        #[arg(value_parser = parse_rc_tag)]
        tag: RcTag,
    },

    /// Upload files as assets of an existing release
    UploadAssets {
        /// Release tag
        #[arg(short, long)]
        tag: String,

        /// Replace assets that already exist
        #[arg(short, long)]
        force: bool,

        /// Files to upload
        #[arg(required = true)]
        assets: Vec<PathBuf>,
    },
}

fn parse_rc_tag(tag: &str) -> Result<RcTag, String> {
    tag.parse().map_err(|e: ReleaseError| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = cicd_tools::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("failed to open log file")?;

    match cli.command {
        Command::ToxIni {
            ini_file,
            platform,
            root,
            drivers,
            conda,
        } => {
            commands::tox_ini::run(&ini_file, platform, root.as_deref(), &drivers, &conda)?;
        }
        Command::ServerInfo {
            server_log,
            login_name,
            pid_file,
            retries,
            interval,
            package_root,
        } => {
            let preference = commands::server_info::resolve_preference(
                ProtocolPreference::from_env(),
                package_root.as_deref(),
            )?;
            let line = commands::server_info::run(
                &server_log,
                pid_file.as_deref(),
                retries,
                Duration::from_secs(interval),
                &SshProcessLister::new(login_name),
                &preference,
            )?;
            println!("{}", line);
        }
        Command::Protocol { package_root } => {
            println!("{}", commands::protocol::run(&package_root)?);
        }
        Command::Promote { tag } => {
            let config = GitHubConfig::from_env().ok_or(ReleaseError::MissingToken)?;
            let work_dir = std::env::current_dir()?;

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(commands::promote::run(&config, &work_dir, &tag))?;
        }
        Command::UploadAssets { tag, force, assets } => {
            let config = GitHubConfig::from_env().ok_or(ReleaseError::MissingToken)?;
            let work_dir = std::env::current_dir()?;

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(commands::upload_assets::run(
                    &config, &work_dir, &tag, &assets, force,
                ))?;
        }
    }

    Ok(())
}
