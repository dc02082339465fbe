//! cli
//!
//! Command-line interface layer for Forgehand.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load layered configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers resolve defaults (flags, then config,
//! then the origin remote) and call into [`crate::orchestrator`],
//! [`crate::forge`], and [`crate::version`], which hold all behavior.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Per-invocation settings shared by every command handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Explicit config file, replacing the global one.
    pub config_file: Option<PathBuf>,
}

impl Context {
    /// Output verbosity implied by the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The effective working directory.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().context("failed to read current directory"),
        }
    }

    /// Load configuration, layering the repository file at `repo_dir` if any.
    pub fn load_config(&self, repo_dir: Option<&Path>) -> Result<Config> {
        let config = match &self.config_file {
            Some(file) => {
                let repo = repo_dir
                    .map(Config::repo_config_path)
                    .filter(|p| p.exists());
                Config::load_from(Some(file), repo.as_deref())
            }
            None => Config::load(repo_dir),
        };
        config.context("failed to load configuration")
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        config_file: cli.config_file.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}
