//! Subcommand handlers for the `cicd` binary

pub mod promote;
pub mod protocol;
pub mod server_info;
pub mod tox_ini;
pub mod upload_assets;
