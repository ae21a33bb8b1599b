//! Shared domain building blocks for the designvault document store.
//!
//! This crate has zero internal deps so the ledger, the orchestrator and any
//! tooling binary can all depend on it:
//!
//! - [`config`]: environment-variable helpers for service configs.
//! - [`error::CoreError`]: the error taxonomy shared by every crate.
//! - [`value`]: recursive merge and canonicalization of JSON document trees.
//! - [`hashing`]: content hashes over canonical JSON.
//! - [`diff`]: whole-value and section-level diffs.
//! - [`semver`]: `major.minor.patch` versions, bumps and ranges.
//! - [`status`]: the composable collection status tag set.
//! - [`collection`] / [`store`]: the Collection model and in-memory store.

pub mod collection;
pub mod config;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod semver;
pub mod status;
pub mod store;
pub mod types;
pub mod value;

pub use collection::{Collection, CollectionStats};
pub use error::{CoreError, CoreResult};
pub use semver::{SemVer, VersionBump};
pub use status::{Status, StatusSet};
pub use store::CollectionStore;
