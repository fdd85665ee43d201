//! # Transition Subcommand
//!
//! Runs one lifecycle transition for an organization in a document through
//! the mutation coordinator and the portal API.
//!
//! ```bash
//! export PORTAL_API_URL=https://portal.example.com
//! export PORTAL_API_TOKEN=...
//! placement transition --file orgs.json --org o1 --action approve --expiry 2099-01-01
//! placement transition --file orgs.json --org o2 --action reactivate --no-expiry --write
//! placement transition --file orgs.json --org o3 --action suspend --dry-run
//! ```
//!
//! Exit codes: `0` committed (or planned, with `--dry-run`), `2` more input is
//! needed, `1` anything else.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use placement_client::{config, HttpStatusService, PortalApiConfig};
use placement_core::{CalendarDate, OrganizationId};
use placement_state::{
    plan_transition, ExpiryInput, Organization, TransitionAction, TransitionDecision,
    TransitionRequest,
};
use placement_sync::{
    CoordinatorConfig, EntityStore, ExecuteOutcome, InMemoryEntityStore, MutationCoordinator,
    SystemClock,
};

use crate::loader::{load_organizations, save_organizations};

/// Exit code when the transition needs an expiry decision.
pub const EXIT_NEEDS_INPUT: u8 = 2;

/// Arguments for `placement transition`.
#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Organization document (JSON or YAML).
    #[arg(long, short)]
    pub file: PathBuf,

    /// Organization to transition.
    #[arg(long)]
    pub org: OrganizationId,

    /// Action to perform (APPROVE, REJECT, SUSPEND, REACTIVATE).
    #[arg(long)]
    pub action: TransitionAction,

    /// Agreement expiry for transitions into ACTIVE.
    #[arg(long, conflicts_with = "no_expiry")]
    pub expiry: Option<CalendarDate>,

    /// Activate without an agreement expiry.
    #[arg(long)]
    pub no_expiry: bool,

    /// Validate and print the plan without contacting the portal.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the confirmed record back into the document.
    #[arg(long, conflicts_with = "dry_run")]
    pub write: bool,

    /// Portal API base URL [env: PORTAL_API_URL, default: http://127.0.0.1:8080].
    #[arg(long)]
    pub api_url: Option<String>,

    /// Portal API bearer token [env: PORTAL_API_TOKEN].
    #[arg(long)]
    pub api_token: Option<String>,

    /// Request timeout in seconds [env: PORTAL_TIMEOUT_SECS, default: 30].
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Transport retries before giving up [env: PORTAL_MAX_RETRIES, default: 3].
    #[arg(long)]
    pub max_retries: Option<u32>,
}

impl TransitionArgs {
    /// The expiry decision expressed by the flags, if any.
    pub fn expiry_input(&self) -> Option<ExpiryInput> {
        match (self.expiry, self.no_expiry) {
            (Some(date), _) => Some(ExpiryInput::On(date)),
            (None, true) => Some(ExpiryInput::NoExpiry),
            (None, false) => None,
        }
    }

    /// Portal settings: flags first, then the `PORTAL_*` environment.
    fn api_config(&self) -> Result<PortalApiConfig> {
        self.api_config_with(|name| std::env::var(name).ok())
    }

    fn api_config_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<PortalApiConfig> {
        let flag = |name: &str| match name {
            config::ENV_API_URL => self.api_url.clone(),
            config::ENV_API_TOKEN => self.api_token.clone(),
            config::ENV_TIMEOUT_SECS => self.timeout_secs.map(|s| s.to_string()),
            config::ENV_MAX_RETRIES => self.max_retries.map(|n| n.to_string()),
            _ => None,
        };
        PortalApiConfig::from_lookup(|name| flag(name).or_else(|| env(name)))
            .context("invalid portal API configuration")
    }
}

/// Execute the transition subcommand.
pub fn run_transition(args: &TransitionArgs) -> Result<u8> {
    let orgs = load_organizations(&args.file)?;
    let current = find(&orgs, &args.org, &args.file)?;

    let mut request = TransitionRequest::resolve(args.org.clone(), current.status, args.action)?;
    if let Some(expiry) = args.expiry_input() {
        request = request.with_expiry(expiry);
    }

    if args.dry_run {
        return dry_run(current, &request);
    }

    let config = args.api_config()?;
    tracing::debug!(?config, "portal API configuration");
    let remote = HttpStatusService::new(&config)?;
    let store = InMemoryEntityStore::from_organizations(orgs);
    let coordinator = MutationCoordinator::with_clock(
        Arc::new(store.clone()),
        Arc::new(remote),
        Arc::new(SystemClock),
        CoordinatorConfig::default(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(coordinator.execute(request))?;

    match outcome {
        ExecuteOutcome::Committed(record) => {
            println!("OK: organization {} is now {}", record.id, record.status);
            if let Some(validity) = coordinator.validity(&record.id) {
                println!("  {}", validity.description);
            }
            if args.write {
                save_organizations(&args.file, &store.list())?;
                println!("  wrote {}", args.file.display());
            }
            Ok(0)
        }
        ExecuteOutcome::NeedsInput { to, missing } => {
            report_needs_input(args.action, to, missing);
            Ok(EXIT_NEEDS_INPUT)
        }
    }
}

fn find<'a>(
    orgs: &'a [Organization],
    id: &OrganizationId,
    file: &Path,
) -> Result<&'a Organization> {
    orgs.iter()
        .find(|o| &o.id == id)
        .with_context(|| format!("organization {id} not found in {}", file.display()))
}

fn dry_run(current: &Organization, request: &TransitionRequest) -> Result<u8> {
    match plan_transition(current.status, request, CalendarDate::today_utc())? {
        TransitionDecision::Ready(plan) => {
            let expiry = match plan.agreement_expiry {
                Some(ExpiryInput::On(date)) => format!(", agreement expiry {date}"),
                Some(ExpiryInput::NoExpiry) => ", no agreement expiry".to_string(),
                None => String::new(),
            };
            println!(
                "PLAN: {} {}: {} -> {}{expiry}",
                plan.action, current.id, plan.from, plan.to
            );
            Ok(0)
        }
        TransitionDecision::NeedsInput { to, missing } => {
            report_needs_input(request.action, to, missing);
            Ok(EXIT_NEEDS_INPUT)
        }
    }
}

fn report_needs_input(
    action: TransitionAction,
    to: placement_state::OrganizationStatus,
    missing: placement_state::MissingInput,
) {
    eprintln!(
        "{action} leads to {to} and needs an {missing}: \
         pass --expiry YYYY-MM-DD or --no-expiry"
    );
}
