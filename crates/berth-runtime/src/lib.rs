//! Runtime-facing data shaping for berth containers.
//!
//! This crate holds the pure transformations the orchestrator applies while
//! building or inspecting a container: merging environment overrides into an
//! existing `EnvironmentSet` (`merge_env`) and correlating `ps` output with a
//! requested set of PIDs (`correlate`, `run_ps`).

pub mod env;
pub mod process;

pub use env::{merge_env, validate_env, EnvEntry, EnvironmentSet};
pub use process::{correlate, run_ps, ProcessTable, DEFAULT_PS_ARGS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid environment entry '{0}': key must not be empty")]
    InvalidEnvEntry(String),
    #[error("couldn't find PID field in ps output")]
    MissingPidColumn,
    #[error("unexpected pid '{0}' in ps output")]
    InvalidPid(String),
    #[error("ps output line {line} has {found} fields, expected at least {expected}")]
    MalformedProcessRow {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("process not found: {}", format_pids(.0))]
    ProcessNotFound(Vec<i32>),
    #[error("runtime execution failed: {0}")]
    ExecFailed(String),
}

fn format_pids(pids: &[i32]) -> String {
    pids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
