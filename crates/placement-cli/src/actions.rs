//! # Actions Subcommand
//!
//! Lists the lifecycle actions available from a status, or for one
//! organization in a document.
//!
//! ```bash
//! placement actions --status suspended
//! placement actions --file orgs.json --org o1
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use placement_core::OrganizationId;
use placement_state::{available_actions, OrganizationStatus, TransitionRule};

use crate::loader::load_organizations;

/// Arguments for `placement actions`.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Status to list actions for (PENDING, ACTIVE, REJECTED, SUSPENDED).
    #[arg(long, conflicts_with_all = ["file", "org"], required_unless_present = "org")]
    pub status: Option<OrganizationStatus>,

    /// Organization document to look `--org` up in.
    #[arg(long, short, requires = "org")]
    pub file: Option<PathBuf>,

    /// Organization whose current status to use.
    #[arg(long, requires = "file")]
    pub org: Option<OrganizationId>,
}

/// Execute the actions subcommand.
pub fn run_actions(args: &ActionsArgs) -> Result<u8> {
    let status = match (&args.status, &args.file, &args.org) {
        (Some(status), _, _) => *status,
        (None, Some(file), Some(id)) => {
            let orgs = load_organizations(file)?;
            orgs.iter()
                .find(|o| &o.id == id)
                .map(|o| o.status)
                .with_context(|| format!("organization {id} not found in {}", file.display()))?
        }
        _ => bail!("pass --status, or --file with --org"),
    };

    let rules = available_actions(status);
    if rules.is_empty() {
        println!("No actions available from {status}.");
        return Ok(0);
    }
    println!("Actions from {status}:");
    for rule in &rules {
        println!("  {}", format_rule(rule));
    }
    Ok(0)
}

/// Render one available action.
pub fn format_rule(rule: &TransitionRule) -> String {
    let mut line = format!("{:<11} -> {}", rule.action, rule.to);
    if rule.requires_expiry() {
        line.push_str("  (requires --expiry DATE or --no-expiry)");
    }
    line
}
