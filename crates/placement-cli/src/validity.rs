//! # Validity Subcommand
//!
//! Reports whether each organization in a document may operate today.
//!
//! ```bash
//! placement validity --file orgs.yaml
//! placement validity --file orgs.json --today 2026-03-01 --expiring-soon
//! placement validity --file orgs.json --json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use placement_core::{CalendarDate, OrganizationId};
use placement_state::{Organization, OperationalValidity, DEFAULT_EXPIRING_SOON_DAYS};

use crate::loader::load_organizations;

/// Arguments for `placement validity`.
#[derive(Args, Debug)]
pub struct ValidityArgs {
    /// Organization document (JSON or YAML).
    #[arg(long, short)]
    pub file: PathBuf,

    /// Evaluate as of this date instead of today (UTC).
    #[arg(long)]
    pub today: Option<CalendarDate>,

    /// Days ahead that count as "expiring soon".
    #[arg(long, default_value_t = DEFAULT_EXPIRING_SOON_DAYS)]
    pub threshold: i64,

    /// Only report this organization.
    #[arg(long)]
    pub org: Option<OrganizationId>,

    /// Only report organizations whose agreement is expiring soon.
    #[arg(long)]
    pub expiring_soon: bool,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityRow {
    pub id: OrganizationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: placement_state::OrganizationStatus,
    #[serde(flatten)]
    pub validity: OperationalValidity,
}

/// Execute the validity subcommand.
pub fn run_validity(args: &ValidityArgs) -> Result<u8> {
    let orgs = load_organizations(&args.file)?;
    let today = args.today.unwrap_or_else(CalendarDate::today_utc);

    if let Some(id) = &args.org {
        if !orgs.iter().any(|o| &o.id == id) {
            anyhow::bail!("organization {id} not found in {}", args.file.display());
        }
    }

    let rows: Vec<ValidityRow> = evaluate(&orgs, today, args.threshold)
        .into_iter()
        .filter(|row| args.org.as_ref().map_or(true, |id| &row.id == id))
        .filter(|row| !args.expiring_soon || row.validity.expiring_soon)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(0);
    }

    if rows.is_empty() {
        println!("No organizations to report.");
        return Ok(0);
    }
    println!("Agreement validity as of {today}:");
    for row in &rows {
        println!("  {}", format_row(row));
    }
    let operable = rows.iter().filter(|r| r.validity.can_operate).count();
    println!();
    println!("{operable} of {} operable", rows.len());
    Ok(0)
}

/// Evaluate every organization as of `today`.
pub fn evaluate(orgs: &[Organization], today: CalendarDate, threshold: i64) -> Vec<ValidityRow> {
    orgs.iter()
        .map(|org| ValidityRow {
            id: org.id.clone(),
            name: org.name().map(str::to_string),
            status: org.status,
            validity: OperationalValidity::evaluate(org, today, threshold),
        })
        .collect()
}

/// Render one row of the table.
pub fn format_row(row: &ValidityRow) -> String {
    let mut line = format!(
        "{:<20} {:<10} {:<10} {}",
        row.id,
        row.status,
        row.validity.agreement,
        row.validity.description
    );
    if row.validity.expiring_soon {
        line.push_str("  [expiring soon]");
    }
    line
}
