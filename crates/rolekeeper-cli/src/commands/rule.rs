//! Nickname rule commands

use clap::Subcommand;
use rolekeeper_common::models::{GuildId, RoleId, SetRuleRequest};
use rolekeeper_db::Database;
use rolekeeper_engine::admin;

use crate::output::{print_info, print_json, print_success};

#[derive(Subcommand)]
pub enum RuleCommands {
    /// Create or replace the rule for a role
    Set {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,

        /// Format using {username} and/or {display_name}, e.g. "[MOD] {display_name}"
        #[arg(long)]
        format: String,
    },

    /// Delete the rule for a role
    Remove {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,
    },

    /// Show the rule for a role
    Show {
        #[arg(long)]
        guild: GuildId,

        #[arg(long)]
        role: RoleId,
    },

    /// List every rule in a guild
    List {
        #[arg(long)]
        guild: GuildId,
    },
}

pub async fn execute(command: RuleCommands, db: &Database, json: bool) -> anyhow::Result<()> {
    match command {
        RuleCommands::Set {
            guild,
            role,
            format,
        } => {
            let request = SetRuleRequest {
                role_id: role,
                nickname_format: format,
            };
            let rule = admin::set_rule(db, guild, &request).await?;
            print_success(&format!(
                "Rule set for role {}: members will be renamed to '{}'",
                rule.role_id, rule.nickname_format
            ));
        }

        RuleCommands::Remove { guild, role } => {
            if admin::remove_rule(db, guild, role).await? {
                print_success(&format!("The rule for role {role} has been removed."));
            } else {
                print_info(&format!("No rule was found for role {role}, so nothing was changed."));
            }
        }

        RuleCommands::Show { guild, role } => {
            let rule = admin::get_rule(db, guild, role).await?;
            if json {
                return print_json(&rule);
            }
            println!("{} -> {}", rule.role_id, rule.nickname_format);
        }

        RuleCommands::List { guild } => {
            let rules = admin::list_rules(db, guild).await?;
            if json {
                return print_json(&rules);
            }
            if rules.is_empty() {
                print_info("There are no nickname rules configured for this guild.");
            }
            for rule in &rules {
                println!("{} -> {}", rule.role_id, rule.nickname_format);
            }
        }
    }

    Ok(())
}
