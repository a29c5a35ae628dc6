//! Expansion of include entries and copying of skeleton files.

use std::fs;
use std::path::Path;

use crate::error::{io_err, GitResult};

/// Expands one include entry into the files it names.
///
/// A file yields itself. A directory yields every file beneath it, recursing
/// into subdirectories in sorted order, joined with `/` (`ci` ⇒ `ci/build.sh`).
/// Paths are relative to `source_root`.
pub fn expand_include(source_root: &Path, entry: &str) -> GitResult<Vec<String>> {
    let mut out = Vec::new();
    collect(source_root, entry, &mut out)?;
    Ok(out)
}

fn collect(source_root: &Path, relative: &str, out: &mut Vec<String>) -> GitResult<()> {
    let full = source_root.join(relative);
    let meta = fs::metadata(&full).map_err(|e| io_err(&full, e))?;
    if !meta.is_dir() {
        out.push(relative.to_string());
        return Ok(());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&full).map_err(|e| io_err(&full, e))? {
        let entry = entry.map_err(|e| io_err(&full, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let prefix = relative.trim_end_matches('/');
    for name in names {
        collect(source_root, &format!("{prefix}/{name}"), out)?;
    }
    Ok(())
}

/// Exact string match against the exclude list; no globbing.
pub fn is_excluded(file: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|e| e == file)
}

/// Copies `relative` from `source_root` into `worktree`, creating parents.
pub fn copy_into(source_root: &Path, worktree: &Path, relative: &str) -> GitResult<()> {
    let from = source_root.join(relative);
    let to = worktree.join(relative);
    let content = fs::read(&from).map_err(|e| io_err(&from, e))?;
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    fs::write(&to, content).map_err(|e| io_err(&to, e))?;
    Ok(())
}
