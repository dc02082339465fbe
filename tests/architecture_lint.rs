//! Architecture enforcement tests.
//!
//! Git and HTTP access each go through a single doorway:
//!
//! - `git2` is used only under `src/git/` (plus the `Oid` conversion in
//!   `core::types`)
//! - `reqwest` is used only under `src/forge/` and `src/release/`
//! - command handlers never touch either crate and never print tokens
//!
//! These tests scan the source tree so that violations are caught in CI.

use std::fs;
use std::path::{Path, PathBuf};

/// Every `.rs` file under `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap_or_else(|_| panic!("failed to read {}", dir.display())) {
        let path = entry.expect("failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files
}

/// Files outside `allowed` that mention `needle` in non-comment code.
fn violations(needle: &str, allowed: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for path in rust_files(Path::new("src")) {
        let display = path.to_string_lossy().replace('\\', "/");
        if allowed.iter().any(|prefix| display.starts_with(prefix)) {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap();
        for (number, line) in content.lines().enumerate() {
            let code = line.trim_start();
            if code.starts_with("//") {
                continue;
            }
            if code.contains(needle) {
                found.push(format!("{}:{}: {}", display, number + 1, code));
            }
        }
    }
    found
}

#[test]
fn git2_only_in_git_module() {
    let found = violations("git2::", &["src/git/", "src/core/types.rs"]);
    assert!(
        found.is_empty(),
        "git2 used outside src/git/:\n{}",
        found.join("\n")
    );
}

#[test]
fn reqwest_only_in_http_modules() {
    let found = violations("reqwest::", &["src/forge/", "src/release/"]);
    assert!(
        found.is_empty(),
        "reqwest used outside src/forge/ and src/release/:\n{}",
        found.join("\n")
    );
}

#[test]
fn commands_do_not_read_tokens() {
    let found: Vec<_> = violations("bearer_token", &["src/auth/", "src/forge/", "src/release/"])
        .into_iter()
        .filter(|v| v.starts_with("src/cli/"))
        .collect();
    assert!(
        found.is_empty(),
        "command handlers must pass providers, not token values:\n{}",
        found.join("\n")
    );
}

#[test]
fn every_command_module_is_declared() {
    let command_dir = Path::new("src/cli/commands");
    let module = fs::read_to_string(command_dir.join("mod.rs")).unwrap();

    let mut missing = Vec::new();
    for path in rust_files(command_dir) {
        let stem = path.file_stem().unwrap().to_str().unwrap();
        if stem == "mod" {
            continue;
        }
        if !module.contains(&format!("mod {};", stem)) {
            missing.push(stem.to_string());
        }
    }
    assert!(
        missing.is_empty(),
        "command files not declared in mod.rs: {:?}",
        missing
    );
}
