//! Delegated permission commands

use clap::Subcommand;
use rolekeeper_common::models::{GuildId, RoleId};
use rolekeeper_db::Database;
use rolekeeper_engine::admin;
use std::collections::BTreeMap;

use crate::output::{join_ids, print_info, print_json, print_success};

#[derive(Subcommand)]
pub enum DelegationCommands {
    /// Let holders of MANAGER grant and revoke MANAGED
    Grant {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        manager: RoleId,

        #[arg(long)]
        managed: RoleId,
    },

    /// Withdraw a delegated permission
    Revoke {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        manager: RoleId,

        #[arg(long)]
        managed: RoleId,
    },

    /// List delegated permissions, grouped by manager role
    List {
        #[arg(long)]
        guild: GuildId,
    },
}

pub async fn execute(command: DelegationCommands, db: &Database, json: bool) -> anyhow::Result<()> {
    match command {
        DelegationCommands::Grant {
            guild,
            manager,
            managed,
        } => {
            admin::grant_permission(db, guild, manager, managed).await?;
            print_success(&format!(
                "Holders of role {manager} can now manage role {managed}."
            ));
        }

        DelegationCommands::Revoke {
            guild,
            manager,
            managed,
        } => {
            admin::revoke_permission(db, guild, manager, managed).await?;
            print_success(&format!(
                "Holders of role {manager} can no longer manage role {managed}."
            ));
        }

        DelegationCommands::List { guild } => {
            let permissions = admin::list_permissions(db, guild).await?;
            if json {
                return print_json(&permissions);
            }
            if permissions.is_empty() {
                print_info("No role delegation permissions are configured.");
            }

            let mut by_manager: BTreeMap<RoleId, Vec<RoleId>> = BTreeMap::new();
            for p in permissions {
                by_manager
                    .entry(p.manager_role_id)
                    .or_default()
                    .push(p.managed_role_id);
            }
            for (manager, managed) in &by_manager {
                println!("{manager} manages {}", join_ids(managed));
            }
        }
    }

    Ok(())
}
