//! Astro command-line tool
//!
//! Inspect value types and perform single suffix accesses against a
//! scenario, the way a flight script would.

mod commands;
mod output;
mod target;

use std::path::PathBuf;
use std::sync::Once;

use anyhow::Context;
use clap::{Parser, Subcommand};

use astro_sdk::{DispatchConfig, DispatchPolicy};
use commands::access::{AccessOptions, Mode};

#[derive(Parser)]
#[command(name = "astro")]
#[command(about = "Suffix dispatch for flight scripts", long_about = None)]
#[command(version)]
struct Cli {
    /// Dispatch configuration file (astro.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Color output: auto, always or never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the suffixes of a value type
    Members {
        /// Type name (Part, DockingPort, Vessel, VesselEta, PartModule, Resource)
        type_name: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Read a suffix
    Get {
        #[command(flatten)]
        access: AccessArgs,
    },

    /// Assign a suffix
    Set {
        #[command(flatten)]
        access: AccessArgs,
        /// Value to assign
        value: String,
    },

    /// Call a suffix with arguments
    Call {
        #[command(flatten)]
        access: AccessArgs,
        /// Arguments to pass
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Check whether RETURN or BREAK is valid in a position
    Scope {
        /// Keyword to check
        keyword: String,
        /// Position is inside a FUNCTION body
        #[arg(long)]
        in_function: bool,
        /// Position is inside a loop body
        #[arg(long)]
        in_loop: bool,
    },
}

#[derive(clap::Args)]
struct AccessArgs {
    /// Scenario file describing the world
    #[arg(long, short)]
    scenario: PathBuf,
    /// Run as a CPU aboard this vessel instead of the scenario's CPU vessel
    #[arg(long)]
    cpu: Option<String>,
    /// part:<uid>, vessel:<name> or eta:<vessel>
    target: String,
    /// Suffix name
    member: String,
}

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when ASTRO_LOG (or RUST_LOG) is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("ASTRO_LOG").or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn load_policy(config: Option<&PathBuf>) -> anyhow::Result<DispatchPolicy> {
    match config {
        Some(path) => {
            let config = DispatchConfig::from_file(path)
                .with_context(|| format!("Cannot load config {}", path.display()))?;
            Ok(config.policy())
        }
        None => Ok(DispatchPolicy::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    astro_host::init_tables();
    let cli = Cli::parse();
    let color = output::resolve_color_choice(cli.color.as_deref());
    let policy = load_policy(cli.config.as_ref())?;

    let run_access = |access: &AccessArgs, mode: Mode| {
        commands::access::execute(
            AccessOptions {
                scenario: &access.scenario,
                target: &access.target,
                member: &access.member,
                cpu_vessel: access.cpu.as_deref(),
                policy,
                color,
            },
            mode,
        )
    };

    let code = match cli.command {
        Commands::Members { type_name, json } => {
            commands::members::execute(&type_name, json, color)?;
            0
        }
        Commands::Get { access } => run_access(&access, Mode::Get)?,
        Commands::Set { access, value } => run_access(&access, Mode::Set(value))?,
        Commands::Call { access, args } => run_access(&access, Mode::Call(args))?,
        Commands::Scope {
            keyword,
            in_function,
            in_loop,
        } => commands::scope::execute(&keyword, in_function, in_loop, color)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
