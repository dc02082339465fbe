//! ui::output
//!
//! User-facing output.
//!
//! # Design
//!
//! Status lines go to stdout and respect the quiet flag. A command's
//! primary result (file content, a PR URL, an update verdict) is always
//! printed so CI scripts can capture it. Warnings and errors go to stderr.
//!
//! Diagnostic detail is emitted through `tracing`, not through this module.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - only results and errors
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a status message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a command's primary result (always shown).
pub fn result(message: impl Display) {
    println!("{}", message);
}

/// Print an indented detail line (debug mode only).
pub fn detail(key: &str, value: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        println!("  {}: {}", key, value);
    }
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Format an error and its causes, one per line.
///
/// ```
/// use forgehand::ui::output::format_error_chain;
///
/// let err = anyhow::anyhow!("disk full").context("failed to save");
/// assert_eq!(format_error_chain(&err), "failed to save\n  caused by: disk full");
/// ```
pub fn format_error_chain(err: &anyhow::Error) -> String {
    let mut lines = vec![err.to_string()];
    lines.extend(err.chain().skip(1).map(|cause| format!("  caused by: {}", cause)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn error_chain_single() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(format_error_chain(&err), "boom");
    }

    #[test]
    fn error_chain_nested() {
        let err = anyhow::anyhow!("root cause")
            .context("middle")
            .context("top");
        assert_eq!(
            format_error_chain(&err),
            "top\n  caused by: middle\n  caused by: root cause"
        );
    }
}
