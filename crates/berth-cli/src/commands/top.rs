use super::{json_pretty, EXIT_SUCCESS};
use berth_core::{Engine, PsListing};
use berth_runtime::ProcessTable;
use std::path::Path;

pub fn run(
    engine: &Engine,
    container: &str,
    pids: &[i32],
    input: Option<&Path>,
    ps_args: &[String],
    json: bool,
) -> Result<u8, String> {
    let table = if let Some(path) = input {
        let raw = std::fs::read(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        engine.top(container, pids, PsListing::Captured(&raw))
    } else {
        engine.top(container, pids, PsListing::Run(ps_args))
    }
    .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&table)?);
    } else {
        print!("{}", render(&table));
    }
    Ok(EXIT_SUCCESS)
}

/// Align columns to the widest cell; the last column is left ragged.
fn render(table: &ProcessTable) -> String {
    let columns = table.titles.len();
    let mut widths: Vec<usize> = table.titles.iter().map(String::len).collect();
    for row in &table.processes {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&table.titles).chain(&table.processes) {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i + 1 == row.len() {
                    cell.clone()
                } else {
                    format!("{cell:<width$}", width = widths[i])
                }
            })
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}
