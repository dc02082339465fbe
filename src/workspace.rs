//! workspace
//!
//! Exporting a repository snapshot to a working path.
//!
//! The orchestrator never mutates the caller's directory in place: the
//! snapshot (working tree plus `.git`) is copied to a working path first,
//! and all branch and commit work happens on the copy. Files already at
//! the destination are overwritten; files the snapshot does not contain are
//! left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Errors from exporting a snapshot.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("snapshot source does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("snapshot source is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot export {source_dir} into itself ({dest})")]
    NestedDestination { source_dir: PathBuf, dest: PathBuf },

    #[error("failed to walk snapshot: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to export '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> WorkspaceError + '_ {
    move |source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Copy the snapshot at `source` to `dest`, creating `dest` if needed.
///
/// Returns the number of files written. Exporting a directory onto itself
/// is a no-op.
pub fn export_snapshot(source: &Path, dest: &Path) -> Result<usize, WorkspaceError> {
    if !source.exists() {
        return Err(WorkspaceError::SourceMissing(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(WorkspaceError::NotADirectory(source.to_path_buf()));
    }

    let source_abs = source.canonicalize().map_err(io_err(source))?;
    fs::create_dir_all(dest).map_err(io_err(dest))?;
    let dest_abs = dest.canonicalize().map_err(io_err(dest))?;

    if source_abs == dest_abs {
        debug!(path = %source_abs.display(), "snapshot already in place");
        return Ok(0);
    }
    if dest_abs.starts_with(&source_abs) {
        return Err(WorkspaceError::NestedDestination {
            source_dir: source_abs,
            dest: dest_abs,
        });
    }

    let written = copy_tree(&source_abs, &dest_abs)?;
    debug!(
        from = %source_abs.display(),
        to = %dest_abs.display(),
        files = written,
        "exported snapshot"
    );
    Ok(written)
}

fn copy_tree(from: &Path, to: &Path) -> Result<usize, WorkspaceError> {
    let mut written = 0;

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry?;
        let src = entry.path();

        let Ok(relative) = src.strip_prefix(from) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let dst = to.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dst).map_err(io_err(&dst))?;
        } else if file_type.is_symlink() {
            copy_symlink(src, &dst)?;
            written += 1;
        } else {
            fs::copy(src, &dst).map_err(io_err(&dst))?;
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), WorkspaceError> {
    let target = fs::read_link(src).map_err(io_err(src))?;
    if dst.symlink_metadata().is_ok() {
        fs::remove_file(dst).map_err(io_err(dst))?;
    }
    std::os::unix::fs::symlink(&target, dst).map_err(io_err(dst))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), WorkspaceError> {
    fs::copy(src, dst).map(|_| ()).map_err(io_err(dst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn copies_nested_tree_including_dot_git() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(&src.path().join("README.md"), "hello");
        write(&src.path().join("deploy/values.yaml"), "a: 1");
        write(&src.path().join(".git/HEAD"), "ref: refs/heads/master\n");

        let written = export_snapshot(src.path(), dst.path()).unwrap();

        assert_eq!(written, 3);
        assert_eq!(
            fs::read_to_string(dst.path().join("deploy/values.yaml")).unwrap(),
            "a: 1"
        );
        assert!(dst.path().join(".git/HEAD").exists());
    }

    #[test]
    fn overwrites_existing_files() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(&src.path().join("file.txt"), "new");
        write(&dst.path().join("file.txt"), "old");
        write(&dst.path().join("extra.txt"), "kept");

        export_snapshot(src.path(), dst.path()).unwrap();

        assert_eq!(fs::read_to_string(dst.path().join("file.txt")).unwrap(), "new");
        assert!(dst.path().join("extra.txt").exists());
    }

    #[test]
    fn creates_missing_destination() {
        let src = TempDir::new().unwrap();
        let parent = TempDir::new().unwrap();
        write(&src.path().join("a.txt"), "a");
        let dest = parent.path().join("work/tree");

        export_snapshot(src.path(), &dest).unwrap();

        assert!(dest.join("a.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_copied_as_links() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(&src.path().join("target/inner.txt"), "inner");
        std::os::unix::fs::symlink("target", src.path().join("link")).unwrap();

        let written = export_snapshot(src.path(), dst.path()).unwrap();

        assert_eq!(written, 2);
        let link = dst.path().join("link");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("target"));
    }

    #[test]
    fn same_location_is_noop() {
        let src = TempDir::new().unwrap();
        write(&src.path().join("a.txt"), "a");
        assert_eq!(export_snapshot(src.path(), src.path()).unwrap(), 0);
    }

    #[test]
    fn nested_destination_rejected() {
        let src = TempDir::new().unwrap();
        write(&src.path().join("a.txt"), "a");
        let result = export_snapshot(src.path(), &src.path().join("inner"));
        assert!(matches!(result, Err(WorkspaceError::NestedDestination { .. })));
    }

    #[test]
    fn missing_source_rejected() {
        let parent = TempDir::new().unwrap();
        let result = export_snapshot(&parent.path().join("nope"), parent.path());
        assert!(matches!(result, Err(WorkspaceError::SourceMissing(_))));
    }
}
