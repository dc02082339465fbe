//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to libgit2. The orchestrator and
//! the CLI talk to [`Git`]; nothing else imports `git2` for repository
//! work.
//!
//! # Error Handling
//!
//! Git errors are normalized into typed categories:
//! - [`GitError::NotARepo`]: The path is not a git working tree
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::RefExists`]: Ref exists and overwriting was not allowed
//! - [`GitError::UnbornHead`]: HEAD has no commit yet
//! - [`GitError::Checkout`]: The working tree could not be switched
//! - [`GitError::Index`]: The index could not be read or written
//!
//! # Example
//!
//! ```ignore
//! use forgehand::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("./daggerverse"))?;
//! let oid = git.head_oid()?;
//! println!("HEAD is at {}", oid.short(7));
//! ```

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{ErrorCode, IndexAddOption, Repository, Signature, StatusOptions};
use thiserror::Error;

use crate::core::types::{BranchName, Identity, Oid, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path is not a git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// A ref exists and the caller asked not to overwrite it.
    #[error("ref already exists: {refname} (at {oid})")]
    RefExists {
        /// The existing ref
        refname: String,
        /// Where it currently points
        oid: String,
    },

    /// HEAD points at a branch with no commits.
    #[error("HEAD has no commit yet")]
    UnbornHead,

    /// The working tree could not be checked out.
    #[error("checkout of {refname} failed: {message}")]
    Checkout {
        /// The ref being checked out
        refname: String,
        /// libgit2's explanation
        message: String,
    },

    /// The index could not be read, updated or written.
    #[error("index error: {message}")]
    Index {
        /// Description of the failure
        message: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id or ref name.
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Classify a git2 error using the name of the thing being touched.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            ErrorCode::NotFound if context.starts_with("refs/") || context == "HEAD" => {
                GitError::RefNotFound {
                    refname: context.to_string(),
                }
            }
            ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            ErrorCode::UnbornBranch => GitError::UnbornHead,
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn index(err: git2::Error) -> Self {
        GitError::Index {
            message: err.message().to_string(),
        }
    }
}

/// A branch reference and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Full ref name (`refs/heads/<branch>`)
    pub name: RefName,
    /// Target commit
    pub oid: Oid,
}

/// A commit as stored in the object database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// The commit OID
    pub oid: Oid,
    /// First parent, `None` for a root commit
    pub parent: Option<Oid>,
    /// Root tree of the commit
    pub tree: Oid,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Committer name
    pub committer_name: String,
    /// Committer email
    pub committer_email: String,
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files (if requested)
    pub untracked: usize,
}

impl WorktreeStatus {
    /// No staged, unstaged, or untracked changes.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0
    }

    /// Check if there are any staged changes ready to commit.
    pub fn has_staged(&self) -> bool {
        self.staged > 0
    }
}

/// The Git interface.
///
/// Wraps one opened working tree and its object store. A `Git` value is
/// owned by a single orchestration call and is not shared.
pub struct Git {
    repo: Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the repository whose working tree root is `path`.
    ///
    /// Parent directories are not searched: an exported snapshot is opened
    /// exactly where it was written.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Open a repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        Ok(Self { repo })
    }

    /// Root of the working tree.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref to the commit it points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn resolve_ref(&self, refname: &RefName) -> Result<Oid, GitError> {
        let commit = self
            .repo
            .find_reference(refname.as_str())
            .and_then(|r| r.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

        Ok(commit.id().into())
    }

    /// Resolve a ref, returning `None` if it doesn't exist.
    pub fn try_resolve_ref(&self, refname: &RefName) -> Result<Option<Oid>, GitError> {
        match self.resolve_ref(refname) {
            Ok(oid) => Ok(Some(oid)),
            Err(GitError::RefNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve a local branch to its commit.
    pub fn resolve_branch(&self, branch: &BranchName) -> Result<Oid, GitError> {
        self.resolve_ref(&RefName::for_branch(branch))
    }

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnbornHead`] if HEAD has no commit yet
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        Ok(commit.id().into())
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().and_then(|name| BranchName::new(name).ok()))
    }

    // =========================================================================
    // Ref Writes
    // =========================================================================

    /// Point `refs/heads/<branch>` at `oid`.
    ///
    /// With `overwrite` an existing ref is replaced unconditionally; no
    /// ancestry check is made. Without it an existing ref is left alone and
    /// [`GitError::RefExists`] is returned.
    pub fn set_branch(
        &self,
        branch: &BranchName,
        oid: &Oid,
        overwrite: bool,
        log_message: &str,
    ) -> Result<BranchRef, GitError> {
        let refname = RefName::for_branch(branch);

        if !overwrite {
            if let Some(existing) = self.try_resolve_ref(&refname)? {
                return Err(GitError::RefExists {
                    refname: refname.to_string(),
                    oid: existing.to_string(),
                });
            }
        }

        let target = self.to_git2_oid(oid)?;
        // The object must be a commit present in this object store.
        self.repo
            .find_commit(target)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        self.repo
            .reference(refname.as_str(), target, overwrite, log_message)
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

        Ok(BranchRef {
            name: refname,
            oid: oid.clone(),
        })
    }

    /// Make HEAD a symbolic ref to `refs/heads/<branch>`.
    ///
    /// Neither the index nor the working tree is touched.
    pub fn attach_head(&self, branch: &BranchName) -> Result<(), GitError> {
        let refname = RefName::for_branch(branch);
        self.repo
            .set_head(refname.as_str())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))
    }

    // =========================================================================
    // Working Tree
    // =========================================================================

    /// Check out a local branch into the working tree and attach HEAD to it.
    ///
    /// Uses a safe checkout: local modifications that do not conflict with
    /// the target tree are carried over, conflicting ones abort the
    /// checkout with [`GitError::Checkout`].
    pub fn checkout_branch(&self, branch: &BranchName) -> Result<(), GitError> {
        let refname = RefName::for_branch(branch);

        let commit = self
            .repo
            .find_reference(refname.as_str())
            .and_then(|r| r.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

        let mut opts = CheckoutBuilder::new();
        opts.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| GitError::Checkout {
                refname: refname.to_string(),
                message: e.message().to_string(),
            })?;

        self.attach_head(branch)
    }

    /// Get working tree status summary.
    ///
    /// If `include_untracked` is false, untracked files are not counted.
    /// Ignored files are never counted.
    pub fn worktree_status(&self, include_untracked: bool) -> Result<WorktreeStatus, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(include_untracked)
            .recurse_untracked_dirs(include_untracked)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(GitError::index)?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// Stage every change in the working tree.
    ///
    /// Additions and modifications go through `add_all`, which honors the
    /// repository's ignore rules; `update_all` then stages deletions of
    /// tracked files. Returns the status after staging.
    pub fn stage_all(&self) -> Result<WorktreeStatus, GitError> {
        let mut index = self.repo.index().map_err(GitError::index)?;

        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(GitError::index)?;
        index
            .update_all(["*"].iter(), None)
            .map_err(GitError::index)?;
        index.write().map_err(GitError::index)?;

        self.worktree_status(true)
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Commit the current index on top of HEAD.
    ///
    /// HEAD (and the branch it is attached to) moves to the new commit.
    /// The commit is written even when the tree equals the parent's tree.
    pub fn commit_index(&self, message: &str, identity: &Identity) -> Result<CommitRecord, GitError> {
        let mut index = self.repo.index().map_err(GitError::index)?;
        let tree_id = index.write_tree().map_err(GitError::index)?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, &tree_id.to_string()))?;

        let parent = match self.repo.head() {
            Ok(head) => Some(
                head.peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, "HEAD"))?,
            ),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let signature =
            Signature::now(identity.name(), identity.email()).map_err(|e| GitError::Internal {
                message: format!("invalid signature: {}", e.message()),
            })?;

        let commit_id = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| GitError::Internal {
                message: format!("commit: {}", e.message()),
            })?;

        self.commit_record(&commit_id.into())
    }

    /// Read a commit back from the object store.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_record(&self, oid: &Oid) -> Result<CommitRecord, GitError> {
        let commit = self
            .repo
            .find_commit(self.to_git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let committer = commit.committer();

        Ok(CommitRecord {
            oid: oid.clone(),
            parent: commit.parent_ids().next().map(Oid::from),
            tree: commit.tree_id().into(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            committer_name: committer.name().unwrap_or("").to_string(),
            committer_email: committer.email().unwrap_or("").to_string(),
        })
    }

    fn to_git2_oid(&self, oid: &Oid) -> Result<git2::Oid, GitError> {
        git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    /// Get the URL for a remote, `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }

    /// `(owner, repo)` of the `origin` remote, when it is a GitHub URL.
    pub fn github_origin(&self) -> Result<Option<(String, String)>, GitError> {
        Ok(self
            .remote_url("origin")?
            .and_then(|url| crate::forge::github::parse_github_url(&url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn not_found_on_ref_is_ref_not_found() {
            let err = GitError::from_git2(
                git2::Error::new(ErrorCode::NotFound, git2::ErrorClass::Reference, "missing"),
                "refs/heads/main",
            );
            assert!(matches!(err, GitError::RefNotFound { refname } if refname == "refs/heads/main"));
        }

        #[test]
        fn not_found_on_object_is_object_not_found() {
            let err = GitError::from_git2(
                git2::Error::new(ErrorCode::NotFound, git2::ErrorClass::Odb, "missing"),
                "abc123",
            );
            assert!(matches!(err, GitError::ObjectNotFound { .. }));
        }

        #[test]
        fn unborn_branch_maps_to_unborn_head() {
            let err = GitError::from_git2(
                git2::Error::new(
                    ErrorCode::UnbornBranch,
                    git2::ErrorClass::Reference,
                    "unborn",
                ),
                "HEAD",
            );
            assert!(matches!(err, GitError::UnbornHead));
        }

        #[test]
        fn ref_exists_display_names_ref_and_target() {
            let err = GitError::RefExists {
                refname: "refs/heads/feature".into(),
                oid: "abc".into(),
            };
            assert_eq!(
                err.to_string(),
                "ref already exists: refs/heads/feature (at abc)"
            );
        }
    }

    mod worktree_status {
        use super::*;

        #[test]
        fn default_is_clean() {
            let status = WorktreeStatus::default();
            assert!(status.is_clean());
            assert!(!status.has_staged());
        }

        #[test]
        fn untracked_files_make_it_dirty() {
            let status = WorktreeStatus {
                untracked: 1,
                ..Default::default()
            };
            assert!(!status.is_clean());
        }

        #[test]
        fn staged_changes() {
            let status = WorktreeStatus {
                staged: 3,
                ..Default::default()
            };
            assert!(status.has_staged());
        }
    }
}
