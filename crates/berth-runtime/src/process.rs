use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::process::Command;

/// Arguments passed to `ps` when the caller supplies none.
pub const DEFAULT_PS_ARGS: &[&str] = &["-ef"];

const PID_TITLE: &str = "PID";

/// Process listing narrowed to the PIDs a caller asked about.
///
/// Every row has exactly `titles.len()` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTable {
    pub titles: Vec<String>,
    pub processes: Vec<Vec<String>>,
}

impl ProcessTable {
    pub fn pid_column(&self) -> Option<usize> {
        self.titles.iter().position(|t| t == PID_TITLE)
    }
}

/// Parse tabular `ps` output and keep only the rows whose PID is in `wanted`.
///
/// The first line supplies the column titles. Data lines are split on
/// whitespace; tokens past the last column are joined back with single spaces
/// so a command line survives intact. Either every requested PID is matched or
/// the call fails with [`RuntimeError::ProcessNotFound`].
pub fn correlate(raw: &[u8], wanted: &[i32]) -> Result<ProcessTable, RuntimeError> {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.lines();

    let titles: Vec<String> = lines
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    let pid_index = titles
        .iter()
        .position(|t| t == PID_TITLE)
        .ok_or(RuntimeError::MissingPidColumn)?;
    let last = titles.len() - 1;

    let wanted_set: HashSet<i32> = wanted.iter().copied().collect();
    let mut found = HashSet::new();
    let mut processes = Vec::new();

    for (offset, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let line_no = offset + 2;
        let Some(pid_field) = fields.get(pid_index) else {
            return Err(RuntimeError::MalformedProcessRow {
                line: line_no,
                found: fields.len(),
                expected: titles.len(),
            });
        };
        let pid: i32 = pid_field
            .parse()
            .map_err(|_| RuntimeError::InvalidPid((*pid_field).to_owned()))?;
        if !wanted_set.contains(&pid) {
            continue;
        }
        if fields.len() < titles.len() {
            return Err(RuntimeError::MalformedProcessRow {
                line: line_no,
                found: fields.len(),
                expected: titles.len(),
            });
        }

        let mut row: Vec<String> = fields[..last].iter().map(|f| (*f).to_owned()).collect();
        row.push(fields[last..].join(" "));
        processes.push(row);
        found.insert(pid);
    }

    let mut seen = HashSet::new();
    let missing: Vec<i32> = wanted
        .iter()
        .copied()
        .filter(|pid| !found.contains(pid) && seen.insert(*pid))
        .collect();
    if !missing.is_empty() {
        return Err(RuntimeError::ProcessNotFound(missing));
    }

    Ok(ProcessTable { titles, processes })
}

/// Run the host `ps` with `args` (or [`DEFAULT_PS_ARGS`] when empty) and
/// return its stdout.
pub fn run_ps<S: AsRef<str>>(args: &[S]) -> Result<Vec<u8>, RuntimeError> {
    let mut cmd = Command::new("ps");
    if args.is_empty() {
        cmd.args(DEFAULT_PS_ARGS);
    } else {
        for arg in args {
            let arg: &str = arg.as_ref();
            cmd.arg(arg);
        }
    }
    tracing::debug!("running {cmd:?}");

    let output = cmd
        .output()
        .map_err(|e| RuntimeError::ExecFailed(format!("failed to run ps: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RuntimeError::ExecFailed(format!(
            "ps exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}
