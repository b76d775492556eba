use super::{json_pretty, EXIT_SUCCESS};
use berth_core::Engine;

pub fn run(engine: &Engine, container: &str, json: bool) -> Result<u8, String> {
    let meta = engine.inspect(container).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&meta)?);
    } else {
        println!("id:          {}", meta.id);
        println!("name:        {}", meta.name);
        println!("image:       {}", meta.image);
        println!("created_at:  {}", meta.created_at);
        println!("updated_at:  {}", meta.updated_at);
        println!("env:");
        for entry in &meta.env {
            println!("  {entry}");
        }
        if meta.security.is_default() {
            println!("security_opt: (runtime default)");
        } else {
            println!("security_opt:");
            for opt in meta.security.to_options() {
                println!("  {opt}");
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
