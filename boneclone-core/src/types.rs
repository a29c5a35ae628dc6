//! Descriptor model shared by every BoneClone crate.
//!
//! These are plain data types: the run configuration, provider credentials,
//! discovered repositories, the eligibility descriptor read from inside a
//! target repository, and the handle of an opened change request.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_TARGET_BRANCH: &str = "main";
pub const DEFAULT_COMMITTER_NAME: &str = "boneclone";
pub const DEFAULT_COMMITTER_EMAIL: &str = "boneclone@example.org";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Updated via boneclone";

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// Source-control host a provider entry talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GitHub,
    GitLab,
    Azure,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::GitHub, ProviderKind::GitLab, ProviderKind::Azure]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::GitHub => write!(f, "github"),
            ProviderKind::GitLab => write!(f, "gitlab"),
            ProviderKind::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "gitlab" => Ok(ProviderKind::GitLab),
            "azure" => Ok(ProviderKind::Azure),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One provider entry: which host, which org/group, and how to authenticate.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Case-insensitive provider tag (`github`, `gitlab`, `azure`).
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub username: String,
    /// Organisation (GitHub), group (GitLab) or organisation URL (Azure).
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub token: String,
    /// Overrides the provider's default API host.
    #[serde(default, alias = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderCredentials {
    pub fn kind(&self) -> Result<ProviderKind, ConfigError> {
        self.provider.parse()
    }
}

// Hand-written so the token never ends up in logs or panic messages.
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("provider", &self.provider)
            .field("username", &self.username)
            .field("org", &self.org)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Which local files are propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub include: Vec<String>,
    /// Exact relative paths skipped after directory expansion.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Directory the include paths are resolved against.
    #[serde(default = "default_source_root", alias = "sourceRoot")]
    pub source_root: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            include: vec![],
            exclude: vec![],
            source_root: default_source_root(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

/// Eligibility marker: where the descriptor lives and which skeleton we are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Path of the descriptor inside each target repository.
    #[serde(default)]
    pub filename: String,
    /// Skeleton name. Matched against the descriptor's `accepts` list and
    /// used as the display name in change requests.
    #[serde(default)]
    pub name: String,
}

/// Committer identity and landing mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Open a change request instead of pushing to the target branch.
    #[serde(default, rename = "pullRequest", alias = "pull_request")]
    pub pull_request: bool,
    #[serde(default, rename = "targetBranch", alias = "target_branch")]
    pub target_branch: String,
    #[serde(default, rename = "commitMessage", alias = "commit_message")]
    pub commit_message: String,
}

impl GitConfig {
    pub fn target_branch_or_default(&self) -> &str {
        non_empty_or(&self.target_branch, DEFAULT_TARGET_BRANCH)
    }

    pub fn committer_name(&self) -> &str {
        non_empty_or(&self.name, DEFAULT_COMMITTER_NAME)
    }

    pub fn committer_email(&self) -> &str {
        non_empty_or(&self.email, DEFAULT_COMMITTER_EMAIL)
    }

    pub fn commit_message(&self) -> &str {
        non_empty_or(&self.commit_message, DEFAULT_COMMIT_MESSAGE)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Change-request template overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Full intent of one synchronisation run. Never mutated after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub providers: Vec<ProviderCredentials>,
    #[serde(default)]
    pub files: FileConfig,
    #[serde(default)]
    pub identifier: IdentifierConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
}

impl GlobalConfig {
    /// Trimmed skeleton name; empty when unset.
    pub fn skeleton_name(&self) -> &str {
        self.identifier.name.trim()
    }
}

// ---------------------------------------------------------------------------
// Discovery and landing
// ---------------------------------------------------------------------------

/// A repository discovered on a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Display name. Azure uses `"<project>/<repository>"`.
    pub name: String,
    pub clone_url: String,
}

impl RepositoryRef {
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// Eligibility descriptor read from inside a target repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDescriptor {
    /// Skeleton names this repository opts into.
    #[serde(default)]
    pub accepts: Vec<String>,
    /// Usernames to request reviews from.
    #[serde(default)]
    pub reviewers: Vec<String>,
}

impl RemoteDescriptor {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Whitespace-trimmed exact match. An empty skeleton name never matches.
    pub fn accepts_skeleton(&self, skeleton: &str) -> bool {
        let skeleton = skeleton.trim();
        if skeleton.is_empty() {
            return false;
        }
        self.accepts.iter().any(|a| a.trim() == skeleton)
    }

    /// Reviewer usernames with blanks removed.
    pub fn reviewer_names(&self) -> impl Iterator<Item = &str> {
        self.reviewers
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
    }
}

/// Handle of a change request opened on a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestHandle {
    pub id: u64,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_is_case_insensitive() {
        assert_eq!("GitHub".parse::<ProviderKind>().unwrap(), ProviderKind::GitHub);
        assert_eq!("GITLAB".parse::<ProviderKind>().unwrap(), ProviderKind::GitLab);
        assert_eq!(" azure ".parse::<ProviderKind>().unwrap(), ProviderKind::Azure);
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let err = "bitbucket".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(ref tag) if tag == "bitbucket"));
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn provider_kind_display_roundtrips() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn debug_redacts_token() {
        let creds = ProviderCredentials {
            provider: "github".into(),
            username: "bot".into(),
            org: "acme".into(),
            token: "ghp_supersecret".into(),
            base_url: None,
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("ghp_supersecret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn git_defaults_apply_when_unset() {
        let git = GitConfig::default();
        assert_eq!(git.target_branch_or_default(), "main");
        assert_eq!(git.committer_name(), "boneclone");
        assert_eq!(git.committer_email(), "boneclone@example.org");
        assert_eq!(git.commit_message(), "Updated via boneclone");
    }

    #[test]
    fn configured_target_branch_wins() {
        let git = GitConfig {
            target_branch: "develop".into(),
            ..GitConfig::default()
        };
        assert_eq!(git.target_branch_or_default(), "develop");
    }

    #[test]
    fn reviewer_names_skip_blanks() {
        let d = RemoteDescriptor {
            accepts: vec![],
            reviewers: vec![" alice ".into(), "".into(), "bob".into()],
        };
        let names: Vec<_> = d.reviewer_names().collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
