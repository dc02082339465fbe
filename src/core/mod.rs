//! core
//!
//! Domain types and configuration shared by every other module.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, RefName, Oid, Identity
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Configuration is passed explicitly into each operation; nothing is
//!   held as ambient module state

pub mod config;
pub mod types;
