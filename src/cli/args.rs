//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--config-file <path>`: Use this config file instead of the global one

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Forgehand - CI automation for GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "fh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if fh was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; results and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of the global config
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Where a local git operation runs.
#[derive(Args, Debug, Clone, Default)]
pub struct WorkTreeArgs {
    /// Repository working tree (defaults to --cwd or the current directory)
    #[arg(long, value_name = "PATH")]
    pub repo_path: Option<PathBuf>,

    /// Export this repository snapshot into --repo-path before running
    #[arg(long, value_name = "SNAPSHOT", requires = "repo_path")]
    pub from: Option<PathBuf>,
}

/// Which GitHub repository a remote operation targets.
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// Repository owner (defaults to config, then the origin remote)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (defaults to config, then the origin remote)
    #[arg(long)]
    pub repo: Option<String>,

    /// Token source: `env:VAR`, `file:PATH`, or a literal token
    #[arg(long, value_name = "SRC")]
    pub token: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Local branch operations
    #[command(
        name = "branch",
        long_about = "Create and update local branches.\n\n\
            Branch creation checks out the base branch and points a new branch \
            reference at its tip. No commit is made."
    )]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Stage every change and commit it onto a branch
    #[command(
        name = "commit",
        long_about = "Stage all working-tree changes and commit them.\n\n\
            The branch is pointed at the current HEAD before committing, so it \
            does not need to exist. HEAD is attached to the branch and both \
            advance to the new commit. A commit is made even if nothing changed.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Commit everything onto feature-x
    fh commit feature-x --title \"Bump istio to 1.22.0\"

    # Commit inside a fresh export of a repository snapshot
    fh commit bump --from /src/repo --repo-path /work/repo \\
        --author-name ci-bot --author-email ci-bot@example.com"
    )]
    Commit {
        /// Branch to commit onto
        branch: String,

        /// Commit message
        #[arg(long, short = 'm', default_value = crate::orchestrator::DEFAULT_COMMIT_TITLE)]
        title: String,

        /// Author and committer name (defaults to config)
        #[arg(long)]
        author_name: Option<String>,

        /// Author and committer email (defaults to config)
        #[arg(long)]
        author_email: Option<String>,

        #[command(flatten)]
        worktree: WorkTreeArgs,
    },

    /// Remote file operations
    #[command(name = "file")]
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Pull request operations
    #[command(name = "pr")]
    Pr {
        #[command(subcommand)]
        action: PrAction,
    },

    /// Remote branch reference operations
    #[command(name = "ref")]
    Ref {
        #[command(subcommand)]
        action: RefAction,
    },

    /// Upstream release tracking for a version-config document
    #[command(
        name = "version",
        long_about = "Compare the version recorded in a version-config document \
            (data.version of a YAML file) with the latest upstream release."
    )]
    Version {
        #[command(subcommand)]
        action: VersionAction,
    },
}

/// Branch subcommands
#[derive(Subcommand, Debug)]
pub enum BranchAction {
    /// Create a local branch at the tip of a base branch
    #[command(after_help = "\
WORKFLOW EXAMPLES:
    # Branch off master
    fh branch create feature-x

    # Branch off develop, leaving an existing feature-x alone
    fh branch create feature-x --base develop --keep-existing")]
    Create {
        /// Name of the new branch
        name: String,

        /// Branch to start from (defaults to config, then master)
        #[arg(long)]
        base: Option<String>,

        /// Fail instead of moving the branch if it already exists
        #[arg(long)]
        keep_existing: bool,

        #[command(flatten)]
        worktree: WorkTreeArgs,
    },
}

/// File subcommands
#[derive(Subcommand, Debug)]
pub enum FileAction {
    /// Print a file's base64 content as stored on a remote branch
    Get {
        /// Branch to read from
        #[arg(long)]
        branch: String,

        /// Path of the file within the repository
        #[arg(long)]
        path: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}

/// Pull request subcommands
#[derive(Subcommand, Debug)]
pub enum PrAction {
    /// Open a pull request
    #[command(after_help = "\
WORKFLOW EXAMPLES:
    # Open a PR from feature-x into master
    fh pr create --title \"Bump istio\" --head feature-x

    # Read the token from a file
    fh pr create --title \"Bump istio\" --head feature-x --token file:/run/secrets/gh")]
    Create {
        /// Pull request title
        #[arg(long)]
        title: String,

        /// Branch with the changes
        #[arg(long)]
        head: String,

        /// Branch to merge into (defaults to config, then master)
        #[arg(long)]
        base: Option<String>,

        /// Pull request description
        #[arg(long)]
        body: Option<String>,

        /// Open as a draft
        #[arg(long)]
        draft: bool,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}

/// Remote reference subcommands
#[derive(Subcommand, Debug)]
pub enum RefAction {
    /// Create a remote branch at the tip of another remote branch
    Create {
        /// Name of the new branch
        #[arg(long = "new")]
        new_branch: String,

        /// Branch to start from (defaults to config, then master)
        #[arg(long)]
        base: Option<String>,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}

/// Version subcommands
#[derive(Subcommand, Debug)]
pub enum VersionAction {
    /// Report whether a newer upstream release exists
    #[command(after_help = "\
WORKFLOW EXAMPLES:
    # Prints \"Create PR\" or \"No PR needed\"
    fh version check --config deploy/istio-version.yaml")]
    Check {
        /// Version-config document (defaults to config)
        #[arg(long = "config", value_name = "FILE")]
        config_path: Option<PathBuf>,

        /// Owner of the upstream repository (defaults to config, then istio)
        #[arg(long)]
        feed_owner: Option<String>,

        /// Name of the upstream repository (defaults to config, then istio)
        #[arg(long)]
        feed_repo: Option<String>,

        /// Token source for the release feed (anonymous if unset)
        #[arg(long, value_name = "SRC")]
        token: Option<String>,
    },

    /// Rewrite data.version in a version-config document
    Update {
        /// Version-config document (defaults to config)
        #[arg(long = "config", value_name = "FILE")]
        config_path: Option<PathBuf>,

        /// Version to record (defaults to the latest upstream release)
        #[arg(long)]
        to: Option<String>,

        /// Owner of the upstream repository (defaults to config, then istio)
        #[arg(long)]
        feed_owner: Option<String>,

        /// Name of the upstream repository (defaults to config, then istio)
        #[arg(long)]
        feed_repo: Option<String>,

        /// Token source for the release feed (anonymous if unset)
        #[arg(long, value_name = "SRC")]
        token: Option<String>,
    },
}
