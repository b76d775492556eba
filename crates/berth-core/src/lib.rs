//! Core orchestration for berth containers.
//!
//! This crate ties the schema, store, and runtime layers together: collision-free
//! ID allocation and short-name search (`allocate_id`, `allocate_name`), the
//! cross-process `StoreLock`, and the `Engine` that the CLI drives to create,
//! inspect, reconfigure, and remove containers.

pub mod concurrency;
pub mod engine;
pub mod identity;

pub use concurrency::StoreLock;
pub use engine::{Engine, PsListing};
pub use identity::{allocate_id, allocate_id_with, allocate_name, random_id, NAME_WINDOW};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("spec error: {0}")]
    Spec(#[from] berth_schema::SpecError),
    #[error("{0}")]
    Security(#[from] berth_schema::SecurityOptError),
    #[error("store error: {0}")]
    Store(#[from] berth_store::StoreError),
    #[error("runtime error: {0}")]
    Runtime(#[from] berth_runtime::RuntimeError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("name '{name}' is already in use by container {existing_id}")]
    NameInUse { name: String, existing_id: String },
    #[error("every short name derived from '{0}' is already bound")]
    NamesExhausted(String),
    #[error("no container matching '{0}'")]
    ContainerNotFound(String),
    #[error("ambiguous container reference '{reference}': matches {count} containers")]
    AmbiguousReference { reference: String, count: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
