use super::{json_pretty, short_id, EXIT_SUCCESS};
use berth_core::Engine;

pub fn run(engine: &Engine, container: &str, json: bool) -> Result<u8, String> {
    let meta = engine.remove(container).map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({
            "id": meta.id,
            "name": meta.name,
            "status": "removed"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("removed container '{}' ({})", meta.name, short_id(&meta.id));
    }
    Ok(EXIT_SUCCESS)
}
