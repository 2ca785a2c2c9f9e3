//! Core policy-enforcement engine for hookguard: intent classification,
//! the TDD phase automaton, per-phase sandbox policy matching, tiered
//! enforcement decisions, and response compliance validation.
//!
//! Every component here is a pure, synchronous, in-memory computation.
//! Session, skill, and profile state live on disk and are handed in as
//! typed values; the core renders allow/deny decisions and never performs
//! process- or filesystem-level enforcement itself.

pub mod cache;
pub mod classifier;
pub mod compliance;
pub mod enforcement;
pub mod error;
pub mod io;
pub mod paths;
pub mod phase;
pub mod sandbox;
pub mod session;
pub mod skill;
pub mod types;

pub use error::{GuardError, Result};
