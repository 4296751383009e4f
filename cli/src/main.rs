//! PERMIT — capability resolution inspector
//!
//! Answers "can this actor do that?" from the command line, using the
//! compiled-in registry and default grants plus an optional TOML override
//! file.
//!
//! Usage:
//!   cargo run -p permit-cli -- capabilities
//!   cargo run -p permit-cli -- defaults --role OWNER
//!   cargo run -p permit-cli -- check --role VIEWER --user u-42 --overrides overrides.toml create:risk
//!   cargo run -p permit-cli -- granted --role CEO --json
//!   cargo run -p permit-cli -- matrix --overrides overrides.toml

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use permit_contracts::{
    error::{PermitError, PermitResult},
    role::{Actor, Role},
};
use permit_core::{defaults, registry, traits::OverrideStore, Authorizer, GrantSource, Resolver};
use permit_store::TomlOverrideStore;

/// Exit status of `check` when the capability is denied.
const EXIT_DENIED: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

/// PERMIT — layered capability resolution.
///
/// Resolves capabilities by applying user overrides, then role overrides,
/// then compiled-in role defaults.
#[derive(Parser)]
#[command(
    name = "permit",
    about = "Inspect layered capability resolution",
    long_about = "Resolves capabilities for roles and users by applying user overrides,\n\
                  role overrides, and compiled-in role defaults, in that order."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every registered capability, grouped by category.
    Capabilities,
    /// Show the capabilities a role holds with no overrides.
    Defaults {
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },
    /// Resolve one capability. Exits 0 when granted, 2 when denied.
    Check {
        /// Capability code, e.g. "create:risk".
        code: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
        /// User whose overrides apply.
        #[arg(long, default_value = "anonymous")]
        user: String,
        /// TOML override file.
        #[arg(long)]
        overrides: Option<PathBuf>,
    },
    /// List every capability an actor holds after overrides.
    Granted {
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[arg(long, default_value = "anonymous")]
        user: String,
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Print a JSON array instead of one code per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective role × capability grid with role overrides applied.
    Matrix {
        #[arg(long)]
        overrides: Option<PathBuf>,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse().map_err(|e: PermitError| e.to_string())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("permit error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Command) -> PermitResult<i32> {
    // Refuse to answer anything if the compiled-in policy is inconsistent.
    permit_core::validate()?;

    match command {
        Command::Capabilities => print_capabilities(),
        Command::Defaults { role } => print_defaults(role),
        Command::Check { code, role, user, overrides } => {
            return check(&code, Actor::new(user, role), overrides.as_deref());
        }
        Command::Granted { role, user, overrides, json } => {
            print_granted(Actor::new(user, role), overrides.as_deref(), json)?
        }
        Command::Matrix { overrides } => print_matrix(overrides.as_deref())?,
    }

    Ok(0)
}

fn load_store(path: Option<&Path>) -> PermitResult<TomlOverrideStore> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading override file");
            TomlOverrideStore::from_file(path)
        }
        None => Ok(TomlOverrideStore::empty()),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn print_capabilities() {
    for (category, defs) in registry::by_category() {
        println!("{}", category.label());
        for def in defs {
            println!("  {:<28} {}", def.code, def.label);
        }
        println!();
    }
    println!("{} capabilities registered.", registry::len());
}

fn print_defaults(role: Role) {
    let grants = defaults::default_grants(role);
    println!("{} holds {} of {} capabilities by default:", role, grants.len(), registry::len());
    for code in grants {
        println!("  {}", code);
    }
}

fn check(code: &str, actor: Actor, overrides: Option<&Path>) -> PermitResult<i32> {
    let authorizer = Authorizer::new(Box::new(load_store(overrides)?));
    let resolution = authorizer.explain(&actor, code)?;

    let verdict = if resolution.granted { "GRANTED" } else { "DENIED" };
    let source = match resolution.source {
        GrantSource::UserOverride => format!("user override for '{}'", actor.user_id),
        GrantSource::RoleOverride => format!("role override for {}", actor.role),
        GrantSource::RoleDefault => format!("{} default", actor.role),
        GrantSource::Unregistered => "capability is not registered".to_string(),
    };
    println!("{} {} ({})", verdict, code, source);

    Ok(if resolution.granted { 0 } else { EXIT_DENIED })
}

fn print_granted(actor: Actor, overrides: Option<&Path>, json: bool) -> PermitResult<()> {
    let authorizer = Authorizer::new(Box::new(load_store(overrides)?));
    let granted = authorizer.granted(&actor)?;

    if json {
        let rendered = serde_json::to_string_pretty(&granted).map_err(|e| PermitError::ConfigError {
            reason: format!("failed to render granted set: {}", e),
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    for code in granted.iter() {
        println!("{}", code);
    }
    Ok(())
}

/// One cell per role: `+` granted, `.` denied, suffixed with `*` when a role
/// override decided the cell.
fn print_matrix(overrides: Option<&Path>) -> PermitResult<()> {
    let store = load_store(overrides)?;

    let mut role_lists = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        role_lists.push((role, store.role_overrides(role)?));
    }
    let resolvers: Vec<Resolver<'_>> = role_lists
        .iter()
        .map(|(role, list)| Resolver::new(*role, list, &[]))
        .collect();

    print!("{:<28}", "capability");
    for resolver in &resolvers {
        print!(" {:>10}", resolver.role().as_str());
    }
    println!();

    for def in registry::all() {
        print!("{:<28}", def.code);
        for resolver in &resolvers {
            let resolution = resolver.explain(def.code);
            let mark = if resolution.granted { "+" } else { "." };
            let decided = if resolution.source == GrantSource::RoleOverride { "*" } else { "" };
            print!(" {:>10}", format!("{}{}", mark, decided));
        }
        println!();
    }

    Ok(())
}
