//! Exclusive group commands

use clap::Subcommand;
use rolekeeper_common::models::{GuildId, RoleId};
use rolekeeper_db::Database;
use rolekeeper_engine::admin;

use crate::output::{join_ids, print_info, print_json, print_success};

#[derive(Subcommand)]
pub enum ExclusiveCommands {
    /// Add a role to a group, moving it out of its current group
    Add {
        #[arg(long)]
        guild: GuildId,

        /// Group name, case-insensitive
        #[arg(long)]
        group: String,

        #[arg(long)]
        role: RoleId,
    },

    /// Take a role out of its group
    Remove {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,
    },

    /// List every group and its roles
    List {
        #[arg(long)]
        guild: GuildId,
    },
}

pub async fn execute(command: ExclusiveCommands, db: &Database, json: bool) -> anyhow::Result<()> {
    match command {
        ExclusiveCommands::Add { guild, group, role } => {
            let name = admin::add_exclusive_role(db, guild, &group, role).await?;
            print_success(&format!("Added role {role} to the '{name}' exclusive group."));
        }

        ExclusiveCommands::Remove { guild, role } => {
            if admin::remove_exclusive_role(db, guild, role).await? {
                print_success(&format!("Removed role {role} from its exclusive group."));
            } else {
                print_info(&format!("Role {role} is not in an exclusive group."));
            }
        }

        ExclusiveCommands::List { guild } => {
            let groups = admin::list_exclusive_groups(db, guild).await?;
            if json {
                return print_json(&groups);
            }
            if groups.is_empty() {
                print_info("No mutually exclusive role groups are configured.");
            }
            for group in &groups {
                println!("{}: {}", group.name, join_ids(&group.role_ids));
            }
        }
    }

    Ok(())
}
