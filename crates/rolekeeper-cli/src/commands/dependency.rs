//! Role dependency commands

use clap::Subcommand;
use rolekeeper_common::models::{GuildId, RoleId};
use rolekeeper_db::Database;
use rolekeeper_engine::admin;

use crate::output::{print_info, print_json, print_success};

#[derive(Subcommand)]
pub enum DependencyCommands {
    /// Make ROLE require REQUIRES; granting ROLE also grants REQUIRES
    Add {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,

        #[arg(long)]
        requires: RoleId,
    },

    /// Drop a dependency edge
    Remove {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,

        #[arg(long)]
        requires: RoleId,
    },

    /// List every dependency edge in a guild
    List {
        #[arg(long)]
        guild: GuildId,
    },
}

pub async fn execute(command: DependencyCommands, db: &Database, json: bool) -> anyhow::Result<()> {
    match command {
        DependencyCommands::Add {
            guild,
            role,
            requires,
        } => {
            admin::add_dependency(db, guild, role, requires).await?;
            print_success(&format!("Role {role} now requires role {requires}."));
        }

        DependencyCommands::Remove {
            guild,
            role,
            requires,
        } => {
            if admin::remove_dependency(db, guild, role, requires).await? {
                print_success(&format!("Role {role} no longer requires role {requires}."));
            } else {
                print_info(&format!("Role {role} did not require role {requires}."));
            }
        }

        DependencyCommands::List { guild } => {
            let dependencies = admin::list_dependencies(db, guild).await?;
            if json {
                return print_json(&dependencies);
            }
            if dependencies.is_empty() {
                print_info("No role dependencies are configured.");
            }
            for d in &dependencies {
                println!("{} requires {}", d.role_id, d.required_role_id);
            }
        }
    }

    Ok(())
}
