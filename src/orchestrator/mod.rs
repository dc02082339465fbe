//! orchestrator
//!
//! Local branch and commit orchestration on an exported working tree.
//!
//! Two operations are offered:
//!
//! - [`Orchestrator::ensure_local_branch`] checks out a base branch and
//!   points a new branch at its tip.
//! - [`Orchestrator::commit_all_changes`] stages everything in the working
//!   tree and commits it onto a named branch started at HEAD.
//!
//! Both are blocking and one-shot. A failure in the middle of a sequence is
//! surfaced unchanged and may leave the working tree on the base branch;
//! nothing is rolled back.
//!
//! # Example
//!
//! ```ignore
//! use forgehand::orchestrator::{BranchPolicy, Orchestrator};
//!
//! let orch = Orchestrator::from_snapshot(snapshot, workdir)?;
//! let branch = orch.ensure_local_branch(&base, &feature, BranchPolicy::Overwrite)?;
//! let commit = orch.commit_all_changes(&feature, "Update file", &identity)?;
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::{BranchName, Identity, RefName};
use crate::git::{BranchRef, CommitRecord, Git, GitError};
use crate::workspace::{self, WorkspaceError};

/// Commit message used when the caller gives none.
pub const DEFAULT_COMMIT_TITLE: &str = "Update file";

/// Status line reported after a successful commit.
pub const COMMITTED_STATUS: &str = "successfully committed changes";

/// Errors from orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A named ref (or HEAD) does not resolve to a commit.
    #[error("reference not found: {refname}")]
    ReferenceNotFound { refname: String },

    /// The target branch exists and the policy forbids moving it.
    #[error("branch '{branch}' already exists at {oid}")]
    BranchExists { branch: BranchName, oid: String },

    /// The base branch could not be checked out.
    #[error("failed to check out '{branch}': {message}")]
    Checkout { branch: BranchName, message: String },

    /// Working-tree changes could not be staged.
    #[error("failed to stage changes")]
    Staging(#[source] GitError),

    /// The commit object or branch advance could not be written.
    #[error("failed to commit changes")]
    Commit(#[source] GitError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl OrchestratorError {
    fn from_ref_lookup(err: GitError) -> Self {
        match err {
            GitError::RefNotFound { refname } => OrchestratorError::ReferenceNotFound { refname },
            GitError::UnbornHead => OrchestratorError::ReferenceNotFound {
                refname: "HEAD".into(),
            },
            other => OrchestratorError::Git(other),
        }
    }
}

/// What to do when the branch being created already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Move the branch to the new target, whatever it pointed at before.
    #[default]
    Overwrite,
    /// Leave the branch alone and fail with [`OrchestratorError::BranchExists`].
    KeepExisting,
}

/// Status line reported after [`Orchestrator::ensure_local_branch`].
pub fn branch_created_status(branch: &BranchName) -> String {
    format!("created local branch {}", branch)
}

/// Branch and commit operations on one working tree.
#[derive(Debug)]
pub struct Orchestrator {
    git: Git,
    work_dir: PathBuf,
}

impl Orchestrator {
    /// Open the repository whose working tree is `work_dir`.
    pub fn open(work_dir: &Path) -> Result<Self, OrchestratorError> {
        let git = Git::open(work_dir)?;
        Ok(Self {
            git,
            work_dir: work_dir.to_path_buf(),
        })
    }

    /// Export `snapshot` into `work_dir`, then open the copy.
    pub fn from_snapshot(snapshot: &Path, work_dir: &Path) -> Result<Self, OrchestratorError> {
        let files = workspace::export_snapshot(snapshot, work_dir)?;
        debug!(files, "snapshot exported");
        Self::open(work_dir)
    }

    /// Root of the working tree being orchestrated.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The underlying git doorway.
    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Check out `base` and point `new_branch` at its tip.
    ///
    /// HEAD is left attached to `base`. With [`BranchPolicy::Overwrite`] an
    /// existing `new_branch` is moved without any fast-forward check.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::ReferenceNotFound`] if `base` does not exist
    /// - [`OrchestratorError::Checkout`] if the working tree conflicts
    /// - [`OrchestratorError::BranchExists`] under `KeepExisting`
    pub fn ensure_local_branch(
        &self,
        base: &BranchName,
        new_branch: &BranchName,
        policy: BranchPolicy,
    ) -> Result<BranchRef, OrchestratorError> {
        self.git
            .resolve_branch(base)
            .map_err(OrchestratorError::from_ref_lookup)?;

        self.git.checkout_branch(base).map_err(|e| match e {
            GitError::Checkout { message, .. } => OrchestratorError::Checkout {
                branch: base.clone(),
                message,
            },
            other => OrchestratorError::from_ref_lookup(other),
        })?;

        let head = self
            .git
            .head_oid()
            .map_err(OrchestratorError::from_ref_lookup)?;

        let overwrite = policy == BranchPolicy::Overwrite;
        let log_message = format!("forgehand: branch {} from {}", new_branch, base);
        let branch_ref = self
            .git
            .set_branch(new_branch, &head, overwrite, &log_message)
            .map_err(|e| match e {
                GitError::RefExists { oid, .. } => OrchestratorError::BranchExists {
                    branch: new_branch.clone(),
                    oid,
                },
                other => OrchestratorError::Git(other),
            })?;

        info!(
            branch = %new_branch,
            base = %base,
            oid = %head.short(7),
            "created local branch"
        );
        Ok(branch_ref)
    }

    /// Stage every working-tree change and commit it onto `branch`.
    ///
    /// `branch` is (re)created at the current HEAD commit and HEAD is
    /// attached to it before committing, so the new commit's parent is the
    /// pre-call HEAD and `branch` ends up pointing at the new commit. A
    /// blank `title` falls back to [`DEFAULT_COMMIT_TITLE`]. A commit is
    /// written even when nothing changed.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::ReferenceNotFound`] if HEAD has no commit
    /// - [`OrchestratorError::Staging`] if the index cannot be updated
    /// - [`OrchestratorError::Commit`] if the commit cannot be written
    pub fn commit_all_changes(
        &self,
        branch: &BranchName,
        title: &str,
        identity: &Identity,
    ) -> Result<CommitRecord, OrchestratorError> {
        let head = self
            .git
            .head_oid()
            .map_err(OrchestratorError::from_ref_lookup)?;

        self.git.set_branch(
            branch,
            &head,
            true,
            &format!("forgehand: branch {} at HEAD", branch),
        )?;
        self.git.attach_head(branch)?;
        debug!(branch = %branch, head = %head.short(7), "attached HEAD");

        let status = self.git.stage_all().map_err(OrchestratorError::Staging)?;
        debug!(staged = status.staged, "staged working tree");

        let title = if title.trim().is_empty() {
            DEFAULT_COMMIT_TITLE
        } else {
            title
        };
        let record = self
            .git
            .commit_index(title, identity)
            .map_err(OrchestratorError::Commit)?;

        info!(
            branch = %RefName::for_branch(branch),
            oid = %record.oid.short(7),
            "committed changes"
        );
        Ok(record)
    }
}
