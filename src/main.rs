use std::io;
use std::path::Path;

/// Reset SIGPIPE to default behavior so piping (e.g. `fdwctl targets | less`) exits cleanly
/// instead of panicking on broken pipe.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fdwctl::catalog::postgres::PgCatalog;
use fdwctl::cli::wizard::{validate_selection, Wizard};
use fdwctl::config::loader::{self, DEFAULT_CONFIG_PATH};
use fdwctl::config::types::{FdwConfig, TargetConfig};
use fdwctl::engine::registry::FdwManager;
use fdwctl::engine::Action;
use fdwctl::output::formatter;

/// fdwctl - Oracle to PostgreSQL foreign data wrapper provisioning
#[derive(Parser)]
#[command(name = "fdwctl", version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create schema, server, user mappings and import foreign tables
    Install(SelectionArgs),

    /// Drop and recreate the bridge objects
    Update(SelectionArgs),

    /// Drop schema and server (with dependent tables and mappings)
    Remove(SelectionArgs),

    /// Choose target, database, schemas and action interactively
    Wizard,

    /// List configured targets
    Targets,

    /// Validate configuration without touching the database
    Validate,
}

#[derive(Args)]
struct SelectionArgs {
    /// Target id (prompted when omitted)
    #[arg(short, long)]
    target: Option<String>,

    /// Database name on the target (prompted when omitted)
    #[arg(short, long)]
    database: Option<String>,

    /// Schema to process; repeat for several (prompted when omitted)
    #[arg(short, long = "schema")]
    schemas: Vec<String>,

    /// Skip confirmation prompt
    #[arg(long)]
    auto_approve: bool,
}

/// A fully resolved selection, ready for the engine.
struct Selection<'a> {
    target: &'a TargetConfig,
    database: String,
    schemas: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Install(ref args) => cmd_apply(&cli, Action::Install, args).await,
        Commands::Update(ref args) => cmd_apply(&cli, Action::Update, args).await,
        Commands::Remove(ref args) => cmd_apply(&cli, Action::Remove, args).await,
        Commands::Wizard => cmd_wizard(&cli).await,
        Commands::Targets => cmd_targets(&cli),
        Commands::Validate => cmd_validate(&cli),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn load(cli: &Cli) -> Result<FdwConfig> {
    loader::load_config(Path::new(&cli.config))
}

fn target_label(target: &TargetConfig) -> String {
    format!("{} - {} - {}", target.client, target.fdw_type, target.connection)
}

/// Resolve the selection from flags, asking for whatever is missing.
fn select<'a>(config: &'a FdwConfig, args: &SelectionArgs) -> Result<Selection<'a>> {
    let stdin = io::stdin();
    let mut wizard = Wizard::new(stdin.lock(), io::stdout());

    let target = match &args.target {
        Some(id) => config
            .find_target(id)
            .with_context(|| format!("Target '{}' is not configured", id))?,
        None => wizard.choose_from_list("Available targets:", &config.targets, target_label)?,
    };

    let database = match &args.database {
        Some(name) => target.find_database(name).with_context(|| {
            format!("Database '{}' is not configured for target '{}'", name, target.id)
        })?,
        None => wizard.choose_from_list(
            &format!("Databases for {}:", target.client),
            &target.databases,
            |d| d.name.clone(),
        )?,
    };

    let schemas = if args.schemas.is_empty() {
        wizard.choose_multiple("Schemas available:", &database.schemas)?
    } else {
        args.schemas.clone()
    };

    validate_selection(database, &schemas)?;

    Ok(Selection {
        target,
        database: database.name.clone(),
        schemas,
    })
}

/// Teardown actions need a literal `yes`.
fn confirm(action: Action, selection: &Selection<'_>) -> Result<bool> {
    println!(
        "\n{} This will drop the FDW schema and server for [{}] on {} / {}.",
        "⚠".yellow().bold(),
        selection.schemas.join(", ").red().bold(),
        selection.target.id,
        selection.database
    );
    println!(
        "\nDo you really want to {}? Only '{}' will be accepted.",
        action,
        "yes".bold()
    );
    let stdin = io::stdin();
    let mut wizard = Wizard::new(stdin.lock(), io::stdout());
    let input = wizard.ask("  Enter a value: ")?;
    Ok(input == "yes")
}

async fn run(config: &FdwConfig, action: Action, selection: &Selection<'_>) -> Result<()> {
    let catalog = PgCatalog::new(&config.postgres);
    let manager = FdwManager::new(config);

    let summary = manager
        .execute(
            &catalog,
            selection.target,
            &selection.database,
            &selection.schemas,
            action,
        )
        .await
        .with_context(|| format!("{} failed for target '{}'", action, selection.target.id))?;

    formatter::print_summary(&summary);
    Ok(())
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn cmd_apply(cli: &Cli, action: Action, args: &SelectionArgs) -> Result<()> {
    let config = load(cli)?;
    let selection = select(&config, args)?;

    if action.tears_down() && !args.auto_approve && !confirm(action, &selection)? {
        println!("\n{}", format!("{} cancelled.", action).yellow());
        return Ok(());
    }

    run(&config, action, &selection).await
}

async fn cmd_wizard(cli: &Cli) -> Result<()> {
    let config = load(cli)?;
    let selection = match select(&config, &SelectionArgs::interactive()) {
        Ok(selection) => selection,
        Err(e) => {
            formatter::print_error(&format!("{:#}", e));
            return Ok(());
        }
    };

    let action = {
        let stdin = io::stdin();
        let mut wizard = Wizard::new(stdin.lock(), io::stdout());
        wizard.say("\nAction:")?;
        wizard.say("1) Install")?;
        wizard.say("2) Update (recreate)")?;
        wizard.say("3) Remove")?;
        let choice = wizard.ask("Select action: ")?;
        Action::from_menu_choice(&choice)
    };

    match action {
        Some(action) => run(&config, action, &selection).await,
        None => {
            formatter::print_error("Invalid action");
            Ok(())
        }
    }
}

fn cmd_targets(cli: &Cli) -> Result<()> {
    let config = load(cli)?;
    formatter::print_targets(&config);
    Ok(())
}

fn cmd_validate(cli: &Cli) -> Result<()> {
    let config = load(cli)?;
    formatter::print_success(&format!(
        "Configuration is valid: {} role(s), {} target(s).",
        config.roles.len(),
        config.targets.len()
    ));
    Ok(())
}

impl SelectionArgs {
    fn interactive() -> Self {
        Self {
            target: None,
            database: None,
            schemas: Vec::new(),
            auto_approve: false,
        }
    }
}
