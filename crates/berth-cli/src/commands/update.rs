use super::{json_pretty, EXIT_SUCCESS};
use berth_core::Engine;

pub fn run(
    engine: &Engine,
    container: &str,
    env: &[String],
    security_opt: &[String],
    json: bool,
) -> Result<u8, String> {
    if env.is_empty() && security_opt.is_empty() {
        return Err("nothing to update: pass --env and/or --security-opt".to_owned());
    }

    // Validate the security options against the current profile first so a bad
    // option cannot leave the env half-updated.
    let current = engine.inspect(container).map_err(|e| e.to_string())?;
    let mut probe = current.security.clone();
    berth_schema::parse_security_opts(&mut probe, security_opt).map_err(|e| e.to_string())?;

    let mut meta = current;
    if !env.is_empty() {
        meta = engine
            .update_env(&meta.id, env)
            .map_err(|e| e.to_string())?;
    }
    if !security_opt.is_empty() {
        meta = engine
            .update_security(&meta.id, security_opt)
            .map_err(|e| e.to_string())?;
    }

    if json {
        println!("{}", json_pretty(&meta)?);
    } else {
        println!("updated container '{}'", meta.name);
        for entry in &meta.env {
            println!("  {entry}");
        }
    }
    Ok(EXIT_SUCCESS)
}
