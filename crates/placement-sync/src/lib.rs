//! # placement-sync — Coordinated Lifecycle Mutations
//!
//! Applies lifecycle transitions to a shared organization collection while
//! the authoritative change happens on a remote backend.
//!
//! - **Coordinator** (`coordinator.rs`): [`MutationCoordinator`] tracks the
//!   in-flight transition per organization, applies the optimistic update,
//!   reconciles with the backend's record or rolls back.
//!
//! - **Store** (`store.rs`): the [`EntityStore`] contract and a thread-safe
//!   in-memory implementation with dashboard counters.
//!
//! - **Remote** (`remote.rs`): the [`RemoteStatusService`] contract the
//!   HTTP client implements.
//!
//! - **Clock** (`clock.rs`): injectable "now" and "today".

pub mod clock;
pub mod coordinator;
pub mod remote;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{CoordinatorConfig, CoordinatorError, ExecuteOutcome, MutationCoordinator};
pub use remote::{RemoteError, RemoteStatusService};
pub use store::{EntityStore, InMemoryEntityStore, StatusCounts};
