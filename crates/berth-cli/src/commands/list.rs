use super::{colorize_name, json_pretty, short_id, EXIT_SUCCESS};
use berth_core::Engine;

pub fn run(engine: &Engine, json: bool) -> Result<u8, String> {
    let containers = engine.list().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&containers)?);
    } else if containers.is_empty() {
        println!("no containers found");
    } else {
        println!("{:<14} {:<20} {:<24} CREATED", "ID", "NAME", "IMAGE");
        for c in &containers {
            println!(
                "{:<14} {:<20} {:<24} {}",
                short_id(&c.id),
                colorize_name(&c.name, &c.id),
                c.image,
                c.created_at
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
