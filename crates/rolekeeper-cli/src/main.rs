//! # Rolekeeper CLI
//!
//! Administrative command line over the Rolekeeper stores:
//! - nickname rules, delegated permissions, exclusive groups, dependencies
//! - dependency/exclusivity previews for a role
//! - migrations and a table diagnostic
//!
//! Platform-facing flows (grants, nickname updates, scans) run inside the bot
//! process through `rolekeeper-engine`.

use clap::{Parser, Subcommand};
use rolekeeper_common::config::AppConfig;
use rolekeeper_common::models::{GuildId, RoleId};
use rolekeeper_db::Database;

mod commands;
mod output;

use commands::{delegation, dependency, diagnose, exclusive, rule};

#[derive(Parser)]
#[command(name = "rolekeeper")]
#[command(about = "Rolekeeper administration", long_about = None)]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Check connectivity and count rows in every table
    Diagnose,

    /// Nickname rules
    Rule {
        #[command(subcommand)]
        command: rule::RuleCommands,
    },

    /// Delegated role permissions
    #[command(alias = "delegate")]
    Delegation {
        #[command(subcommand)]
        command: delegation::DelegationCommands,
    },

    /// Mutually exclusive role groups
    Exclusive {
        #[command(subcommand)]
        command: exclusive::ExclusiveCommands,
    },

    /// Role dependencies
    #[command(alias = "dep")]
    Dependency {
        #[command(subcommand)]
        command: dependency::DependencyCommands,
    },

    /// Show what granting a role pulls in and what it competes with
    Resolve {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing (structured logging); stdout stays free for results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Rolekeeper v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(&config.database).await?;
    let result = run(cli, &db).await;
    db.close().await;
    result
}

async fn run(cli: Cli, db: &Database) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Migrate => {
            db.migrate().await?;
            output::print_success("Migrations applied");
            Ok(())
        }
        Commands::Diagnose => diagnose::execute(db, json).await,
        Commands::Rule { command } => rule::execute(command, db, json).await,
        Commands::Delegation { command } => delegation::execute(command, db, json).await,
        Commands::Exclusive { command } => exclusive::execute(command, db, json).await,
        Commands::Dependency { command } => dependency::execute(command, db, json).await,
        Commands::Resolve { guild, role } => {
            let preview = rolekeeper_engine::admin::preview_hierarchy(db, guild, role).await?;
            if json {
                return output::print_json(&preview);
            }

            println!("Role {}", preview.role);
            println!("  requires:       {}", output::join_ids(&preview.requires));
            println!("  full hierarchy: {}", output::join_ids(&preview.hierarchy));
            match &preview.group {
                Some(group) => println!(
                    "  exclusive group '{group}' with: {}",
                    output::join_ids(&preview.exclusive_with)
                ),
                None => println!("  no exclusive group"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_parses_snowflakes() {
        let cli = Cli::try_parse_from([
            "rolekeeper",
            "resolve",
            "--guild",
            "1100000000000000001",
            "--role",
            "42",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Resolve { guild: GuildId(1100000000000000001), role: RoleId(42) }
        ));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(Cli::try_parse_from(["rolekeeper", "rule", "list", "--guild", "abc"]).is_err());
    }
}
