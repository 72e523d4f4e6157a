//! Release candidate promotion
//!
//! A release candidate lives on GitHub as a draft release tagged `vX.Y.Z-rc`
//! (plus an optional `vX.Y.Z-snapshot` development release). Promoting it
//! tags the same commit as `vX.Y.Z`, publishes a final release carrying the
//! candidate's notes and assets, and removes the candidate and snapshot.
//!
//! - [`git`]: local repository operations behind the [`git::GitRepo`] trait
//! - [`github`]: the Releases API client
//! - [`promote`]: the promotion workflow tying both together
//! - [`upload`]: attaching local files to an existing release

pub mod error;
pub mod git;
pub mod github;
pub mod promote;
pub mod upload;
