//! Save/load persistence with version validation
//!
//! Features:
//! - Versioned JSON envelope, compatible with saves written by earlier builds
//! - Version probe before anything is applied (mismatch means "no save")
//! - Explicit per-version migration onto the typed [`SaveDocument`]

pub mod envelope;
pub mod migration;
pub mod validation;

pub use envelope::{SaveDocument, decode, encode};
pub use validation::SchemaVersion;

use thiserror::Error;

/// Why a save could not be written or read
#[derive(Debug, Error)]
pub enum PersistError {
    /// Storage unavailable, quota exceeded or the write was refused
    #[error("storage error: {0}")]
    Storage(String),
    /// Nothing stored under the save key
    #[error("no save present")]
    NotFound,
    #[error("save is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("save could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("save has no version tag")]
    MissingVersion,
    #[error("save version {found} is not supported")]
    Incompatible { found: String },
}
