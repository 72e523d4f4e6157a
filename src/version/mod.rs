//! Version layer for package compatibility checks
//!
//! This module provides the pieces for deciding which versions of a package
//! are usable: normalizing version strings, evaluating conda dependency
//! constraints, and querying a package index for published versions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │PackageIndex │────▶│PackageRecord│
//! │  (search)   │     │ (depends)   │
//! └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ Registries  │     │ Constraint  │
//! │  (conda)    │     │ (satisfies) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`constraint`]: Constraint parsing and evaluation
//! - [`key`]: Version normalization and ordering
//! - [`registry`]: Index trait for fetching package records
//! - [`registries`]: Concrete index implementations (conda)
//! - [`error`]: Error types for index queries
//! - [`types`]: Common types like `PackageRecord`

pub mod constraint;
pub mod error;
pub mod key;
pub mod registries;
pub mod registry;
pub mod types;
