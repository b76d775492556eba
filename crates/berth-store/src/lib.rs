//! Persistent container metadata and the live name index for berth.
//!
//! This crate provides the storage layer: `StoreLayout` for the on-disk directory
//! structure, `MetadataStore` for checksummed per-container metadata, the
//! `ContainerStore` existence abstraction consulted during ID allocation, and the
//! `NameIndex` mapping from short names to container IDs.

pub mod layout;
pub mod metadata;
pub mod names;

pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use metadata::{validate_container_name, ContainerMetadata, ContainerStore, MetadataStore};
pub use names::{MemoryNameIndex, NameIndex};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory so that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("integrity check failed for container '{id}': expected {expected}, got {actual}")]
    IntegrityFailure {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid container name: {0}")]
    InvalidName(String),
    #[error("name '{name}' is already used by container {existing_id}")]
    NameConflict { name: String, existing_id: String },
    #[error("name index unavailable: {0}")]
    IndexPoisoned(String),
}
