mod commands;

use berth_core::Engine;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_SPEC_ERROR, EXIT_STORE_ERROR};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "berth",
    version,
    about = "Container identity and configuration manager"
)]
struct Cli {
    /// Path to the berth store directory.
    #[arg(long, default_value = "~/.local/share/berth", global = true)]
    store: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a container record from a spec file and/or flags.
    Create {
        /// Path to a berth.toml container spec.
        spec: Option<PathBuf>,
        /// Image reference (overrides the berth.toml value).
        #[arg(long)]
        image: Option<String>,
        /// Container name; a short ID-derived name is chosen when omitted.
        #[arg(long)]
        name: Option<String>,
        /// Environment entry KEY=VALUE (repeatable).
        #[arg(short, long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
        /// Security option key=value (repeatable).
        #[arg(long = "security-opt", value_name = "KEY=VALUE")]
        security_opt: Vec<String>,
    },
    /// List all known containers.
    List,
    /// Inspect container metadata.
    Inspect {
        /// Container ID, unique ID prefix, or name.
        container: String,
    },
    /// Remove a container record and release its name.
    Rm {
        /// Container ID, unique ID prefix, or name.
        container: String,
    },
    /// Update a container's environment and security options.
    Update {
        /// Container ID, unique ID prefix, or name.
        container: String,
        /// KEY=VALUE sets a variable, a bare KEY removes it (repeatable).
        #[arg(short, long = "env", value_name = "ENTRY")]
        env: Vec<String>,
        /// Security option key=value (repeatable).
        #[arg(long = "security-opt", value_name = "KEY=VALUE")]
        security_opt: Vec<String>,
    },
    /// Show the rows of a process listing that belong to a container.
    Top {
        /// Container ID, unique ID prefix, or name.
        container: String,
        /// Process ID owned by the container (repeatable).
        #[arg(long = "pid", required = true, value_name = "PID")]
        pids: Vec<i32>,
        /// Read the listing from a file instead of running ps.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Arguments passed to ps (after --).
        #[arg(last = true)]
        ps_args: Vec<String>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("BERTH_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let store_path = expand_tilde(&cli.store);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        command => run_with_engine(command, &store_path, json_output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn run_with_engine(command: Commands, store_path: &Path, json: bool) -> Result<u8, String> {
    // Names are indexed in memory, so anything that binds or frees one holds
    // the store lock for the life of the engine.
    let _lock = match command {
        Commands::Create { .. } | Commands::Rm { .. } | Commands::Update { .. } => {
            Some(commands::lock_store(store_path)?)
        }
        _ => None,
    };
    debug!("opening store at {}", store_path.display());
    let engine = Engine::open(store_path).map_err(|e| e.to_string())?;

    match command {
        Commands::Create {
            spec,
            image,
            name,
            env,
            security_opt,
        } => commands::create::run(
            &engine,
            &commands::create::CreateArgs {
                spec: spec.as_deref(),
                image,
                name,
                env,
                security_opt,
            },
            json,
        ),
        Commands::List => commands::list::run(&engine, json),
        Commands::Inspect { container } => commands::inspect::run(&engine, &container, json),
        Commands::Rm { container } => commands::rm::run(&engine, &container, json),
        Commands::Update {
            container,
            env,
            security_opt,
        } => commands::update::run(&engine, &container, &env, &security_opt, json),
        Commands::Top {
            container,
            pids,
            input,
            ps_args,
        } => commands::top::run(
            &engine,
            &container,
            &pids,
            input.as_deref(),
            &ps_args,
            json,
        ),
        Commands::Completions { .. } => Err("completions do not need a store".to_owned()),
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("spec error:")
        || msg.starts_with("failed to parse container spec")
        || msg.starts_with("failed to read container spec")
    {
        EXIT_SPEC_ERROR
    } else if msg.starts_with("store error:")
        || msg.starts_with("store unavailable:")
        || msg.starts_with("store lock:")
    {
        EXIT_STORE_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
