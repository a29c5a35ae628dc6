//! Provider capabilities and construction.
//!
//! Every host can list repositories ([`RepositoryProvider`]). Opening change
//! requests is an optional capability ([`ChangeRequestProvider`]) queried at
//! the call site through [`RepositoryProvider::change_requests`], so a
//! discovery-only host never has to stub out methods it cannot honour.

use std::time::Duration;

use boneclone_core::{ChangeRequestHandle, ProviderCredentials, ProviderKind, RepositoryRef};
use boneclone_renderer::{BodyBuilder, BodyContext};

use crate::azure::AzureProvider;
use crate::error::ProviderError;
use crate::github::GitHubProvider;
use crate::gitlab::GitLabProvider;
use crate::http::DEFAULT_TIMEOUT;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Minimum capability: enumerate the repositories in scope.
pub trait RepositoryProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn list_repositories(&self) -> Result<Vec<RepositoryRef>, ProviderError>;

    /// `Some` when this host can open change requests.
    fn change_requests(&self) -> Option<&dyn ChangeRequestProvider> {
        None
    }
}

/// Optional capability used by the request landing strategy.
pub trait ChangeRequestProvider: Send + Sync {
    fn open_change_request(
        &self,
        request: &ChangeRequest<'_>,
        body: &dyn BodyBuilder,
    ) -> Result<ChangeRequestHandle, ProviderError>;

    /// `repository` is the same name [`RepositoryProvider::list_repositories`]
    /// returned (project-qualified on Azure).
    fn assign_reviewers(
        &self,
        repository: &str,
        handle: &ChangeRequestHandle,
        reviewers: &[String],
    ) -> Result<(), ProviderError>;
}

/// Parameters of one change request.
#[derive(Debug, Clone, Copy)]
pub struct ChangeRequest<'a> {
    pub repository: &'a str,
    pub base_branch: &'a str,
    pub head_branch: &'a str,
    pub title: &'a str,
    pub skeleton: &'a str,
    pub files_changed: &'a [String],
    pub original_author: Option<&'a str>,
}

impl ChangeRequest<'_> {
    pub fn body_context(&self) -> BodyContext {
        BodyContext {
            skeleton: self.skeleton.to_string(),
            repository: self.repository.to_string(),
            base_branch: self.base_branch.to_string(),
            head_branch: self.head_branch.to_string(),
            files_changed: self.files_changed.to_vec(),
            original_author: self.original_author.map(str::to_string),
        }
    }

    pub fn render_body(&self, body: &dyn BodyBuilder) -> Result<String, ProviderError> {
        Ok(body.build(&self.body_context())?)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Builds a provider client from one configured entry.
pub trait ProviderFactory: Send + Sync {
    fn create(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<Box<dyn RepositoryProvider>, ProviderError>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&ProviderCredentials) -> Result<Box<dyn RepositoryProvider>, ProviderError>
        + Send
        + Sync,
{
    fn create(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<Box<dyn RepositoryProvider>, ProviderError> {
        self(credentials)
    }
}

/// Selects the HTTP client by the entry's provider tag.
#[derive(Debug, Clone)]
pub struct DefaultProviderFactory {
    timeout: Duration,
}

impl DefaultProviderFactory {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for DefaultProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFactory for DefaultProviderFactory {
    fn create(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<Box<dyn RepositoryProvider>, ProviderError> {
        let provider: Box<dyn RepositoryProvider> = match credentials.kind()? {
            ProviderKind::GitHub => Box::new(GitHubProvider::new(credentials, self.timeout)?),
            ProviderKind::GitLab => Box::new(GitLabProvider::new(credentials, self.timeout)?),
            ProviderKind::Azure => Box::new(AzureProvider::new(credentials, self.timeout)?),
        };
        Ok(provider)
    }
}

pub(crate) fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ProviderError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProviderError::MissingField(field))
    } else {
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use boneclone_core::ConfigError;

    fn creds(provider: &str) -> ProviderCredentials {
        ProviderCredentials {
            provider: provider.to_string(),
            username: "bot".into(),
            org: "https://dev.azure.com/acme".into(),
            token: "t".into(),
            base_url: None,
        }
    }

    #[test]
    fn factory_selects_by_case_insensitive_tag() {
        let factory = DefaultProviderFactory::new();
        assert_eq!(factory.create(&creds("GitHub")).unwrap().kind(), ProviderKind::GitHub);
        assert_eq!(factory.create(&creds("gitlab")).unwrap().kind(), ProviderKind::GitLab);
        assert_eq!(factory.create(&creds("AZURE")).unwrap().kind(), ProviderKind::Azure);
    }

    #[test]
    fn factory_rejects_unknown_tag() {
        let err = DefaultProviderFactory::new()
            .create(&creds("bitbucket"))
            .err()
            .expect("unknown tag must fail");
        assert!(matches!(
            err,
            ProviderError::Config(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn factory_requires_org() {
        let mut c = creds("github");
        c.org = "  ".into();
        let err = DefaultProviderFactory::new().create(&c).err().expect("must fail");
        assert!(matches!(err, ProviderError::MissingField("org")));
    }

    #[test]
    fn built_in_providers_open_change_requests() {
        let factory = DefaultProviderFactory::new();
        for tag in ["github", "gitlab", "azure"] {
            let provider = factory.create(&creds(tag)).unwrap();
            assert!(provider.change_requests().is_some(), "{tag}");
        }
    }

    #[test]
    fn closures_are_factories() {
        let factory = |_: &ProviderCredentials| -> Result<Box<dyn RepositoryProvider>, ProviderError> {
            Err(ProviderError::Transport("offline".into()))
        };
        let err = factory.create(&creds("github")).err().expect("closure error");
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn body_context_carries_request_fields() {
        let files = vec!["ci/build.sh".to_string()];
        let req = ChangeRequest {
            repository: "api",
            base_branch: "main",
            head_branch: "boneclone/update-20250101-000000",
            title: "php update",
            skeleton: "php",
            files_changed: &files,
            original_author: Some("Jane"),
        };
        let ctx = req.body_context();
        assert_eq!(ctx.skeleton, "php");
        assert_eq!(ctx.files_changed, files);
        assert_eq!(ctx.original_author.as_deref(), Some("Jane"));
    }
}
