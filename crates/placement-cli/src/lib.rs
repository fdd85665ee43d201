//! # placement-cli — CLI for the Organization Lifecycle Engine
//!
//! Provides the `placement` command-line interface over organization
//! documents (JSON or YAML) and the portal API.
//!
//! ## Subcommands
//!
//! - `placement validity` — Agreement validity and operability report.
//! - `placement actions` — Lifecycle actions available from a status.
//! - `placement transition` — Run one transition through the coordinator.
//!
//! ```bash
//! placement validity --file orgs.yaml --expiring-soon
//! placement actions --status pending
//! placement transition --file orgs.yaml --org o1 --action approve --expiry 2099-01-01
//! ```

pub mod actions;
pub mod loader;
pub mod transition;
pub mod validity;
