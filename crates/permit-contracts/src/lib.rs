//! # permit-contracts
//!
//! Shared types, override records, and error contracts for the PERMIT
//! permission resolution engine.
//!
//! All crates in the workspace import from here. No resolution logic lives
//! in this crate, only data definitions and error types.

pub mod capability;
pub mod error;
pub mod overrides;
pub mod role;
