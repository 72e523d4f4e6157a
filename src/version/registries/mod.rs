//! Package index implementations

pub mod conda;

pub use conda::CondaIndex;
