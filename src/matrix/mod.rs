//! Test matrix generation
//!
//! Builds a tox configuration that tests every base runtime family against a
//! bounded, representative set of its supported versions.
//!
//! # Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│   Sampler   │────▶│   Emitter   │
//! │ (supported) │     │ (subset)    │     │ (tox.ini)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

pub mod emitter;
pub mod error;
pub mod resolver;
pub mod sampler;

use std::collections::BTreeMap;

/// Sampled versions per family (e.g. "r" -> ["3.4.3", "3.6.1", "4.0.2"])
pub type SampledMatrix = BTreeMap<String, Vec<String>>;
