pub mod completions;
pub mod create;
pub mod inspect;
pub mod list;
pub mod rm;
pub mod top;
pub mod update;

use berth_core::StoreLock;
use berth_store::StoreLayout;
use std::path::Path;
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_SPEC_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn lock_store(store_path: &Path) -> Result<StoreLock, String> {
    let layout = StoreLayout::new(store_path);
    let lock_path = layout.lock_file();
    debug!("acquiring store lock {}", lock_path.display());
    StoreLock::acquire(&lock_path).map_err(|e| format!("store lock: {e}"))
}

/// Render a container name, highlighting names the user picked over
/// ID-derived ones.
pub fn colorize_name(name: &str, id: &str) -> String {
    use console::Style;
    if id.starts_with(name) {
        Style::new().dim().apply_to(name).to_string()
    } else {
        Style::new().cyan().bold().apply_to(name).to_string()
    }
}

/// Short form of an ID for table output.
pub fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
