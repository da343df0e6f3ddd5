//! Download orchestration for the weather portal.
//!
//! The portal exposes no formal API: every unit of work is a two-phase
//! "generate then download" request sequence bound to an authenticated
//! session. This module owns that protocol end to end: session management
//! ([`session`]), work plan expansion ([`planner`]), the per-unit state
//! machine ([`executor`]) and the sequential run loop ([`collector`]).

mod collector;
mod executor;
mod planner;
mod session;

// Re-export public API
pub use collector::{aborts_sub_run, run_collection, RunSummary};
pub use executor::{execute_unit, UnitOutcome};
pub use planner::{build_intervals, build_plan, load_regions};
pub use session::{authenticate, Credential, Session};
