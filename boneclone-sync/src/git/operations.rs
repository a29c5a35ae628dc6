//! The [`RepositoryOperations`] seam and its git-CLI implementation.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use boneclone_core::{GlobalConfig, ProviderCredentials, RemoteDescriptor, RepositoryRef};

use super::files::{copy_into, expand_include, is_excluded};
use super::{
    clone_shallow, commit, current_branch, head_contains, push_branch, read_head_blob,
    ref_exists, run_git, run_git_stdout, staged_files, CommitIdentity, PushResult,
};
use crate::error::{io_err, GitResult};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A checked-out target repository.
///
/// Clones own a temporary directory that is removed when the tree drops.
#[derive(Debug)]
pub struct WorkingTree {
    path: PathBuf,
    _dir: Option<TempDir>,
}

impl WorkingTree {
    /// A tree at an existing path that is not cleaned up on drop.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _dir: None,
        }
    }

    fn temporary(dir: TempDir) -> Self {
        Self {
            path: dir.path().to_path_buf(),
            _dir: Some(dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of reading the descriptor at HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    pub eligible: bool,
    /// Empty when the marker is absent or malformed.
    pub descriptor: RemoteDescriptor,
}

/// What landing the skeleton files did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandReport {
    pub branch: String,
    /// Files that differed from the branch and were committed, in commit order.
    pub files: Vec<String>,
    pub commits: usize,
    /// A push found the remote already current; later include entries were skipped.
    pub up_to_date: bool,
}

// ---------------------------------------------------------------------------
// Seam
// ---------------------------------------------------------------------------

/// Git work performed for one target repository.
pub trait RepositoryOperations: Send + Sync {
    fn clone_repository(
        &self,
        repo: &RepositoryRef,
        credentials: &ProviderCredentials,
    ) -> GitResult<WorkingTree>;

    fn check_eligibility(&self, tree: &WorkingTree, config: &GlobalConfig)
        -> GitResult<Eligibility>;

    fn stage_and_land(
        &self,
        tree: &WorkingTree,
        config: &GlobalConfig,
        credentials: &ProviderCredentials,
        target_branch: &str,
    ) -> GitResult<LandReport>;
}

// ---------------------------------------------------------------------------
// Git CLI implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct GitOperations;

impl GitOperations {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryOperations for GitOperations {
    fn clone_repository(
        &self,
        repo: &RepositoryRef,
        credentials: &ProviderCredentials,
    ) -> GitResult<WorkingTree> {
        let dir = tempfile::Builder::new()
            .prefix("boneclone-")
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        clone_shallow(dir.path(), &repo.clone_url, credentials)?;
        tracing::debug!(repo = %repo, path = %dir.path().display(), "cloned");
        Ok(WorkingTree::temporary(dir))
    }

    fn check_eligibility(
        &self,
        tree: &WorkingTree,
        config: &GlobalConfig,
    ) -> GitResult<Eligibility> {
        let marker = config.identifier.filename.trim();
        if marker.is_empty() || !head_contains(tree.path(), marker)? {
            return Ok(Eligibility::default());
        }

        let raw = read_head_blob(tree.path(), marker)?;
        let descriptor = match RemoteDescriptor::from_yaml(&String::from_utf8_lossy(&raw)) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(marker, error = %e, "descriptor is not valid YAML; skipping");
                return Ok(Eligibility::default());
            }
        };

        Ok(Eligibility {
            eligible: descriptor.accepts_skeleton(config.skeleton_name()),
            descriptor,
        })
    }

    fn stage_and_land(
        &self,
        tree: &WorkingTree,
        config: &GlobalConfig,
        credentials: &ProviderCredentials,
        target_branch: &str,
    ) -> GitResult<LandReport> {
        let workdir = tree.path();
        let source_root = config.files.source_root.as_path();
        let identity = CommitIdentity {
            name: config.git.committer_name().to_string(),
            email: config.git.committer_email().to_string(),
        };

        ensure_on_branch(workdir, target_branch)?;

        let mut report = LandReport {
            branch: target_branch.to_string(),
            ..LandReport::default()
        };

        for entry in &config.files.include {
            for file in expand_include(source_root, entry)? {
                if is_excluded(&file, &config.files.exclude) {
                    continue;
                }
                copy_into(source_root, workdir, &file)?;
                run_git(workdir, &["add", "--", &file])?;
            }

            let changed = staged_files(workdir)?;
            if changed.is_empty() {
                tracing::debug!(branch = target_branch, entry = %entry, "nothing to commit");
                continue;
            }
            commit(workdir, &identity, config.git.commit_message())?;
            report.commits += 1;
            report.files.extend(changed);

            if push_branch(workdir, target_branch, credentials)? == PushResult::AlreadyUpToDate {
                report.up_to_date = true;
                return Ok(report);
            }
            tracing::debug!(branch = target_branch, entry = %entry, "pushed");
        }

        Ok(report)
    }
}

/// Checks out `branch`: the current branch if it matches, else an existing
/// local branch, else a new branch from `origin/<branch>`, else from HEAD.
fn ensure_on_branch(workdir: &Path, branch: &str) -> GitResult<()> {
    if current_branch(workdir)?.as_deref() == Some(branch) {
        return Ok(());
    }
    if ref_exists(workdir, &format!("refs/heads/{branch}"))? {
        run_git(workdir, &["checkout", branch])?;
        return Ok(());
    }
    let remote = format!("refs/remotes/origin/{branch}");
    if ref_exists(workdir, &remote)? {
        run_git(workdir, &["checkout", "-b", branch, &remote])?;
    } else {
        run_git(workdir, &["checkout", "-b", branch])?;
    }
    Ok(())
}

/// `Name <email>` of the last commit in the skeleton checkout, if any.
pub fn source_author(root: &Path) -> Option<String> {
    match run_git_stdout(root, &["log", "-1", "--format=%an <%ae>"]) {
        Ok(author) if !author.is_empty() => Some(author),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "no source author");
            None
        }
    }
}
