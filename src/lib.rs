//! Forgehand - CI automation for GitHub repositories
//!
//! Forgehand bundles the small steps a CI job needs to propose a change
//! to a repository: create a local branch, commit the working tree onto
//! it, open a pull request, and decide whether an upstream release is
//! newer than the version a deployment records.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves defaults)
//! - [`orchestrator`] - Local branch creation and commit-all-changes
//! - [`workspace`] - Repository snapshot export
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - GitHub REST adapter, retry policy, remote operations
//! - [`release`] - Upstream release feed
//! - [`version`] - Version-config documents and version comparison
//! - [`auth`] - Token sources and providers
//! - [`core`] - Domain types and configuration
//! - [`ui`] - User-facing output
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Guarantees
//!
//! 1. Every operation is one-shot: it finishes or fails before returning
//! 2. A branch reference only ever points at a commit that exists
//! 3. Tokens never appear in output, logs, or error messages

pub mod auth;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
pub mod logging;
pub mod orchestrator;
pub mod release;
pub mod ui;
pub mod version;
pub mod workspace;
