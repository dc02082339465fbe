//! Integration tests for branch and commit orchestration.
//!
//! Every test runs against a real repository built with the git CLI, and
//! checks the result with the git CLI rather than through the library.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use forgehand::core::types::{BranchName, Identity};
use forgehand::orchestrator::{BranchPolicy, Orchestrator, OrchestratorError};
use forgehand::workspace::export_snapshot;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that creates a real git repository with one commit on master.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "master"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::open(self.path()).expect("failed to open test repo")
    }

    fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) {
        self.write(path, content);
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    fn rev_parse(&self, rev: &str) -> String {
        git_output(self.path(), &["rev-parse", rev])
    }

    fn symbolic_head(&self) -> String {
        git_output(self.path(), &["symbolic-ref", "HEAD"])
    }

    /// Files in the tree of `rev`.
    fn tree_files(&self, rev: &str) -> Vec<String> {
        git_output(self.path(), &["ls-tree", "-r", "--name-only", rev])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn branch(name: &str) -> BranchName {
    BranchName::new(name).unwrap()
}

fn bot() -> Identity {
    Identity::new("Release Bot", "release-bot@example.com").unwrap()
}

// =============================================================================
// EnsureLocalBranch
// =============================================================================

mod ensure_local_branch {
    use super::*;

    #[test]
    fn new_branch_points_at_base_tip() {
        let repo = TestRepo::new();
        let master = repo.rev_parse("master");

        let created = repo
            .orchestrator()
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        assert_eq!(created.name.as_str(), "refs/heads/feature-x");
        assert_eq!(created.oid.as_str(), master);
        assert_eq!(repo.rev_parse("feature-x"), master);
        // No commit was made.
        assert_eq!(repo.rev_parse("master"), master);
    }

    #[test]
    fn head_stays_on_base() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["branch", "develop"]);
        run_git(repo.path(), &["checkout", "develop"]);
        repo.commit_file("develop.txt", "dev\n", "develop work");
        run_git(repo.path(), &["checkout", "master"]);

        repo.orchestrator()
            .ensure_local_branch(&branch("develop"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        assert_eq!(repo.symbolic_head(), "refs/heads/develop");
        assert!(repo.path().join("develop.txt").exists());
        assert_eq!(repo.rev_parse("feature-x"), repo.rev_parse("develop"));
    }

    #[test]
    fn base_other_than_current_branch_is_checked_out() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["branch", "main"]);
        run_git(repo.path(), &["checkout", "-b", "feature-y"]);
        repo.commit_file("README.md", "# Feature Y\n", "rewrite readme");
        repo.commit_file("feature-y.txt", "y\n", "feature work");
        assert_eq!(repo.symbolic_head(), "refs/heads/feature-y");

        repo.orchestrator()
            .ensure_local_branch(&branch("main"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        assert_eq!(repo.symbolic_head(), "refs/heads/main");
        assert_eq!(repo.rev_parse("feature-x"), repo.rev_parse("main"));
        assert_ne!(repo.rev_parse("feature-x"), repo.rev_parse("feature-y"));
        assert_eq!(
            std::fs::read_to_string(repo.path().join("README.md")).unwrap(),
            "# Test Repo\n"
        );
        assert!(!repo.path().join("feature-y.txt").exists());
        assert_eq!(repo.tree_files("feature-x"), vec!["README.md".to_string()]);
    }

    #[test]
    fn missing_base_is_reference_not_found() {
        let repo = TestRepo::new();

        let err = repo
            .orchestrator()
            .ensure_local_branch(&branch("develop"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::ReferenceNotFound { ref refname } if refname == "refs/heads/develop"
        ));
        let refs = git_output(repo.path(), &["for-each-ref", "refs/heads/feature-x"]);
        assert!(refs.is_empty());
    }

    #[test]
    fn existing_branch_is_overwritten() {
        let repo = TestRepo::new();
        let initial = repo.rev_parse("master");
        run_git(repo.path(), &["branch", "feature-x"]);
        repo.commit_file("a.txt", "a\n", "advance master");
        let master = repo.rev_parse("master");
        assert_eq!(repo.rev_parse("feature-x"), initial);

        repo.orchestrator()
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        assert_eq!(repo.rev_parse("feature-x"), master);
    }

    #[test]
    fn overwrite_does_not_check_ancestry() {
        let repo = TestRepo::new();
        let master = repo.rev_parse("master");
        run_git(repo.path(), &["checkout", "-b", "feature-x"]);
        repo.commit_file("work.txt", "work\n", "feature work");
        run_git(repo.path(), &["checkout", "master"]);

        repo.orchestrator()
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        // The feature commit is no longer reachable from feature-x.
        assert_eq!(repo.rev_parse("feature-x"), master);
    }

    #[test]
    fn keep_existing_refuses_to_move() {
        let repo = TestRepo::new();
        let initial = repo.rev_parse("master");
        run_git(repo.path(), &["branch", "feature-x"]);
        repo.commit_file("a.txt", "a\n", "advance master");

        let err = repo
            .orchestrator()
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::KeepExisting)
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::BranchExists { .. }));
        assert_eq!(repo.rev_parse("feature-x"), initial);
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let repo = TestRepo::new();
        let orchestrator = repo.orchestrator();

        let first = orchestrator
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();
        let second = orchestrator
            .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn conflicting_modification_aborts_checkout() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["checkout", "-b", "develop"]);
        repo.commit_file("README.md", "# Develop\n", "develop readme");
        run_git(repo.path(), &["checkout", "master"]);
        repo.write("README.md", "# Local edit\n");

        let err = repo
            .orchestrator()
            .ensure_local_branch(&branch("develop"), &branch("feature-x"), BranchPolicy::Overwrite)
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::Checkout { .. }));
        let content = std::fs::read_to_string(repo.path().join("README.md")).unwrap();
        assert_eq!(content, "# Local edit\n");
    }
}

// =============================================================================
// CommitAllChanges
// =============================================================================

mod commit_all_changes {
    use super::*;

    #[test]
    fn commits_every_kind_of_change() {
        let repo = TestRepo::new();
        repo.commit_file("gone.txt", "bye\n", "add gone");
        let head = repo.rev_parse("HEAD");

        repo.write("README.md", "# Changed\n");
        std::fs::remove_file(repo.path().join("gone.txt")).unwrap();
        repo.write("deploy/istio/version.yaml", "data:\n  version: 1.22.0\n");

        let record = repo
            .orchestrator()
            .commit_all_changes(&branch("feature-x"), "Bump istio", &bot())
            .unwrap();

        assert_eq!(record.parent.as_ref().map(|p| p.as_str()), Some(head.as_str()));
        assert_eq!(record.message, "Bump istio");
        assert_eq!(record.author_name, "Release Bot");
        assert_eq!(record.author_email, "release-bot@example.com");

        let files = repo.tree_files("feature-x");
        assert!(files.contains(&"README.md".to_string()));
        assert!(files.contains(&"deploy/istio/version.yaml".to_string()));
        assert!(!files.contains(&"gone.txt".to_string()));

        let status = git_output(repo.path(), &["status", "--porcelain"]);
        assert!(status.is_empty(), "worktree not clean: {status}");
    }

    #[test]
    fn branch_and_head_advance_together() {
        let repo = TestRepo::new();
        let master = repo.rev_parse("master");
        repo.write("new.txt", "new\n");

        let record = repo
            .orchestrator()
            .commit_all_changes(&branch("feature-x"), "Update file", &bot())
            .unwrap();

        assert_eq!(repo.rev_parse("feature-x"), record.oid.as_str());
        assert_eq!(repo.rev_parse("HEAD"), record.oid.as_str());
        assert_eq!(repo.symbolic_head(), "refs/heads/feature-x");
        // The branch HEAD was on before is untouched.
        assert_eq!(repo.rev_parse("master"), master);
    }

    #[test]
    fn empty_change_set_still_commits() {
        let repo = TestRepo::new();
        let head = repo.rev_parse("HEAD");

        let record = repo
            .orchestrator()
            .commit_all_changes(&branch("feature-x"), "Nothing to see", &bot())
            .unwrap();

        assert_ne!(record.oid.as_str(), head);
        assert_eq!(record.parent.as_ref().map(|p| p.as_str()), Some(head.as_str()));
        assert_eq!(
            repo.rev_parse("feature-x^{tree}"),
            repo.rev_parse("master^{tree}")
        );
    }

    #[test]
    fn blank_title_uses_default() {
        let repo = TestRepo::new();
        repo.write("new.txt", "new\n");

        let record = repo
            .orchestrator()
            .commit_all_changes(&branch("feature-x"), "  ", &bot())
            .unwrap();

        assert_eq!(record.message, "Update file");
    }

    #[test]
    fn ignored_files_are_not_committed() {
        let repo = TestRepo::new();
        repo.commit_file(".gitignore", "*.log\n", "ignore logs");
        repo.write("build.log", "noise\n");
        repo.write("kept.txt", "kept\n");

        repo.orchestrator()
            .commit_all_changes(&branch("feature-x"), "Update file", &bot())
            .unwrap();

        let files = repo.tree_files("feature-x");
        assert!(files.contains(&"kept.txt".to_string()));
        assert!(!files.contains(&"build.log".to_string()));
    }

    #[test]
    fn existing_branch_is_reset_to_head_first() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["checkout", "-b", "feature-x"]);
        repo.commit_file("old.txt", "old\n", "stale work");
        run_git(repo.path(), &["checkout", "master"]);
        let master = repo.rev_parse("master");
        repo.write("new.txt", "new\n");

        let record = repo
            .orchestrator()
            .commit_all_changes(&branch("feature-x"), "Update file", &bot())
            .unwrap();

        assert_eq!(record.parent.as_ref().map(|p| p.as_str()), Some(master.as_str()));
        assert!(!repo.tree_files("feature-x").contains(&"old.txt".to_string()));
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn branch_then_commit() {
    let repo = TestRepo::new();
    let master = repo.rev_parse("master");
    let orchestrator = repo.orchestrator();

    orchestrator
        .ensure_local_branch(&branch("master"), &branch("feature-x"), BranchPolicy::Overwrite)
        .unwrap();
    repo.write("deploy/istio-version.yaml", "data:\n  version: 1.22.0\n");
    let record = orchestrator
        .commit_all_changes(&branch("feature-x"), "Bump istio", &bot())
        .unwrap();

    assert_eq!(record.parent.as_ref().map(|p| p.as_str()), Some(master.as_str()));
    assert_eq!(repo.rev_parse("feature-x"), record.oid.as_str());
    assert_eq!(repo.rev_parse("master"), master);
    assert_eq!(
        git_output(repo.path(), &["log", "-1", "--format=%an <%ae>", "feature-x"]),
        "Release Bot <release-bot@example.com>"
    );
}

#[test]
fn snapshot_is_exported_before_orchestrating() {
    let source = TestRepo::new();
    source.write("pending.txt", "uncommitted\n");
    let work = TempDir::new().unwrap();
    let work_dir = work.path().join("repo");

    let orchestrator = Orchestrator::from_snapshot(source.path(), &work_dir).unwrap();
    orchestrator
        .commit_all_changes(&branch("feature-x"), "Update file", &bot())
        .unwrap();

    // The copy has the commit, the source is untouched.
    let files = git_output(&work_dir, &["ls-tree", "-r", "--name-only", "feature-x"]);
    assert!(files.lines().any(|f| f == "pending.txt"));
    let source_refs = git_output(source.path(), &["for-each-ref", "refs/heads/feature-x"]);
    assert!(source_refs.is_empty());
}

#[test]
fn snapshot_export_rejects_missing_source() {
    let work = TempDir::new().unwrap();
    let err = Orchestrator::from_snapshot(&work.path().join("absent"), &work.path().join("repo"))
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Workspace(_)));
}

#[test]
fn export_counts_files() {
    let source = TestRepo::new();
    let dest = TempDir::new().unwrap();
    let written = export_snapshot(source.path(), dest.path()).unwrap();
    assert!(written >= 2, "README and .git contents should be copied");
    assert!(dest.path().join("README.md").exists());
    assert!(dest.path().join(".git").is_dir());
}
