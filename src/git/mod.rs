//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. All repository reads and
//! writes flow through [`Git`]; no other module imports `git2` for
//! repository work. Everything goes through libgit2, nothing shells out
//! to the git CLI.
//!
//! # Responsibilities
//!
//! - Opening a working tree
//! - Ref resolution and branch ref writes
//! - Checkout and HEAD attachment
//! - Staging and committing
//! - Remote URL lookup
//!
//! # Invariants
//!
//! - All operations return strong types (Oid, BranchName, RefName)
//! - Branch refs are only ever written under `refs/heads/`

mod interface;

pub use interface::{BranchRef, CommitRecord, Git, GitError, WorktreeStatus};
