use super::{json_pretty, EXIT_SUCCESS};
use berth_core::Engine;
use berth_schema::{parse_spec_file, ContainerSpec};
use std::path::Path;

pub struct CreateArgs<'a> {
    pub spec: Option<&'a Path>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub env: Vec<String>,
    pub security_opt: Vec<String>,
}

/// Combine the berth.toml file (if any) with command-line flags. Flag values for
/// `env` and `security_opt` are appended after the file's.
fn build_spec(args: &CreateArgs<'_>) -> Result<ContainerSpec, String> {
    let mut spec = match (args.spec, &args.image) {
        (Some(path), _) => parse_spec_file(path).map_err(|e| e.to_string())?,
        (None, Some(image)) => ContainerSpec::new(image.clone()),
        (None, None) => {
            return Err("spec error: either a spec file or --image is required".to_owned())
        }
    };
    if let Some(ref image) = args.image {
        spec.image.clone_from(image);
    }
    if args.name.is_some() {
        spec.name.clone_from(&args.name);
    }
    spec.env.extend(args.env.iter().cloned());
    spec.security_opt.extend(args.security_opt.iter().cloned());
    Ok(spec)
}

pub fn run(engine: &Engine, args: &CreateArgs<'_>, json: bool) -> Result<u8, String> {
    let spec = build_spec(args)?;
    let meta = engine.create(&spec).map_err(|e| e.to_string())?;
    let identity = meta.identity();
    if json {
        let payload = serde_json::json!({
            "id": identity.id,
            "name": identity.name,
            "image": meta.image,
            "status": "created"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("created container '{}'", identity.name);
        println!("id: {}", identity.id);
    }
    Ok(EXIT_SUCCESS)
}
