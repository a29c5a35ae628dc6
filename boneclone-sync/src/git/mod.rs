//! Git plumbing for the sync engine.
//!
//! Everything shells out to the `git` binary with system and global
//! configuration disabled, so behaviour does not depend on the host's
//! `~/.gitconfig`. Credentials reach git through `GIT_CONFIG_*` environment
//! variables and are never written to argv or to `.git/config`.

pub mod files;
pub mod operations;

pub use operations::{
    source_author, Eligibility, GitOperations, LandReport, RepositoryOperations, WorkingTree,
};

use std::path::Path;
use std::process::{Command, Output};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use boneclone_core::ProviderCredentials;

use crate::error::{io_err, GitError, GitResult};

/// Identity used for commits, passed with `-c` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Outcome of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    Pushed,
    AlreadyUpToDate,
}

/// Create a git Command with clean environment (no system/user config).
pub(crate) fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// [`git_command`] plus an `http.extraHeader` carrying Basic credentials.
///
/// No header is added when the token is empty (anonymous or `file://` remotes).
pub(crate) fn git_remote_command(workdir: &Path, credentials: &ProviderCredentials) -> Command {
    let mut cmd = git_command(workdir);
    if let Some(header) = auth_header(credentials) {
        cmd.env("GIT_CONFIG_COUNT", "1");
        cmd.env("GIT_CONFIG_KEY_0", "http.extraHeader");
        cmd.env("GIT_CONFIG_VALUE_0", header);
    }
    cmd
}

pub(crate) fn auth_header(credentials: &ProviderCredentials) -> Option<String> {
    if credentials.token.is_empty() {
        return None;
    }
    let pair = format!("{}:{}", credentials.username, credentials.token);
    Some(format!("Authorization: Basic {}", STANDARD.encode(pair)))
}

/// [`git_command`] with the commit identity prepended as `-c` flags.
pub(crate) fn git_commit_command(workdir: &Path, identity: &CommitIdentity) -> Command {
    let mut cmd = git_command(workdir);
    cmd.arg("-c");
    cmd.arg(format!("user.name={}", identity.name));
    cmd.arg("-c");
    cmd.arg(format!("user.email={}", identity.email));
    cmd
}

fn output(cmd: &mut Command, workdir: &Path) -> GitResult<Output> {
    cmd.output().map_err(|e| io_err(workdir, e))
}

fn failed(args: &[&str], output: &Output) -> GitError {
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Run `cmd` with `args`; non-zero exit becomes [`GitError::CommandFailed`].
pub(crate) fn run(mut cmd: Command, workdir: &Path, args: &[&str]) -> GitResult<Output> {
    let out = output(cmd.args(args), workdir)?;
    if out.status.success() {
        Ok(out)
    } else {
        Err(failed(args, &out))
    }
}

/// Run a git command in the given working directory.
pub fn run_git(workdir: &Path, args: &[&str]) -> GitResult<Output> {
    run(git_command(workdir), workdir, args)
}

/// Run a git command and return trimmed stdout.
pub fn run_git_stdout(workdir: &Path, args: &[&str]) -> GitResult<String> {
    let out = run_git(workdir, args)?;
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Exit 0 = true, exit 1 = false, anything else is an error.
fn run_git_predicate(workdir: &Path, args: &[&str]) -> GitResult<bool> {
    let out = output(git_command(workdir).args(args), workdir)?;
    match out.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => Err(failed(args, &out)),
    }
}

/// Shallow clone of `url` into the existing empty directory `dest`.
///
/// Every branch head is fetched so `origin/<branch>` exists for non-default
/// target branches too.
pub fn clone_shallow(dest: &Path, url: &str, credentials: &ProviderCredentials) -> GitResult<()> {
    let target = dest.to_string_lossy();
    let args = [
        "clone",
        "--depth",
        "1",
        "--no-single-branch",
        "--no-tags",
        "--",
        url,
        &*target,
    ];
    run(git_remote_command(dest, credentials), dest, &args)?;
    Ok(())
}

/// Short name of the checked-out branch; `None` when HEAD is detached.
pub fn current_branch(workdir: &Path) -> GitResult<Option<String>> {
    let out = output(
        git_command(workdir).args(["symbolic-ref", "--short", "-q", "HEAD"]),
        workdir,
    )?;
    if out.status.success() {
        Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Whether a fully qualified ref (e.g. `refs/heads/main`) exists.
pub fn ref_exists(workdir: &Path, refname: &str) -> GitResult<bool> {
    run_git_predicate(workdir, &["show-ref", "--verify", "--quiet", refname])
}

/// Paths staged for the next commit, in index order.
pub fn staged_files(workdir: &Path) -> GitResult<Vec<String>> {
    let out = run_git(workdir, &["diff", "--cached", "--name-only", "-z"])?;
    Ok(out
        .stdout
        .split(|b| *b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect())
}

/// Whether `path` exists in the tree of HEAD.
pub fn head_contains(workdir: &Path, path: &str) -> GitResult<bool> {
    let listed = run_git_stdout(workdir, &["ls-tree", "--name-only", "HEAD", "--", path])?;
    Ok(listed.lines().any(|line| line == path))
}

/// Raw content of `path` as recorded at HEAD.
pub fn read_head_blob(workdir: &Path, path: &str) -> GitResult<Vec<u8>> {
    let object = format!("HEAD:{path}");
    Ok(run_git(workdir, &["cat-file", "blob", &object])?.stdout)
}

/// Commit whatever is staged with `message`.
pub fn commit(workdir: &Path, identity: &CommitIdentity, message: &str) -> GitResult<()> {
    run(
        git_commit_command(workdir, identity),
        workdir,
        &["commit", "--no-verify", "-m", message],
    )?;
    Ok(())
}

/// Push local `branch` to the same name on `origin`.
pub fn push_branch(
    workdir: &Path,
    branch: &str,
    credentials: &ProviderCredentials,
) -> GitResult<PushResult> {
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    let args = ["push", "origin", refspec.as_str()];
    let out = output(git_remote_command(workdir, credentials).args(args), workdir)?;

    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);

    if out.status.success() {
        if stdout.contains("Everything up-to-date") || stderr.contains("Everything up-to-date") {
            return Ok(PushResult::AlreadyUpToDate);
        }
        return Ok(PushResult::Pushed);
    }

    if stderr.contains("non-fast-forward") || stderr.contains("rejected") {
        return Err(GitError::PushRejected {
            details: stderr.trim().to_string(),
        });
    }
    Err(failed(&args, &out))
}
