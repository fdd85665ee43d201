//! # placement-core — Foundational Types for the Lifecycle Engine
//!
//! The leaf of the workspace dependency DAG. Defines the primitives every
//! other crate shares:
//!
//! 1. **`OrganizationId`.** Opaque, validated identifier newtype. No bare
//!    strings for identifiers crossing crate boundaries.
//!
//! 2. **`CalendarDate`.** Agreement expiry dates carry no time-of-day. Any
//!    time component or offset present on the wire is discarded at parse
//!    time, so day-granularity comparisons cannot slip across midnight.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision and
//!    a `Z` suffix, used for "last status change" bookkeeping.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `placement-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::CoreError;
pub use identity::OrganizationId;
pub use temporal::{CalendarDate, Timestamp};
