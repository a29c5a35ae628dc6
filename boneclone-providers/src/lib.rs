//! # boneclone-providers
//!
//! Blocking REST clients for the hosts that own target repositories:
//! GitHub organisations, GitLab groups and Azure DevOps organisations.
//!
//! Each client implements [`RepositoryProvider`] for discovery and
//! [`ChangeRequestProvider`] for opening pull/merge requests. Clients are
//! built from configuration entries by a [`ProviderFactory`].

pub mod azure;
pub mod error;
pub mod github;
pub mod gitlab;
mod http;
pub mod provider;

pub use azure::AzureProvider;
pub use error::ProviderError;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use http::DEFAULT_TIMEOUT;
pub use provider::{
    ChangeRequest, ChangeRequestProvider, DefaultProviderFactory, ProviderFactory,
    RepositoryProvider,
};
