//! Run entrypoint: discover repositories on every provider and process each
//! one concurrently.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;

use boneclone_core::{GlobalConfig, ProviderCredentials, RepositoryRef};
use boneclone_providers::{ProviderError, ProviderFactory};

use crate::processor::{LandingStrategy, UnitOutcome};

/// Result of one repository unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub provider: String,
    pub repository: RepositoryRef,
    /// `Err` holds the stage-labelled failure message.
    pub outcome: Result<UnitOutcome, String>,
}

/// A provider entry that produced no units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProvider {
    pub provider: String,
    pub reason: String,
}

/// Everything a run did, for reporting. Never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub units: Vec<UnitReport>,
    pub skipped_providers: Vec<SkippedProvider>,
    /// Units whose thread panicked.
    pub aborted_units: usize,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.units.iter().filter(|u| u.outcome.is_err()).count() + self.aborted_units
    }

    pub fn is_clean(&self) -> bool {
        self.failures() == 0 && self.skipped_providers.is_empty()
    }
}

/// Process every repository of every configured provider.
///
/// Providers are visited in order; creating a client and listing its
/// repositories happen on the blocking pool, and a failure in either skips
/// that provider. Each repository becomes one blocking unit; the call returns
/// once every unit has finished.
///
/// `_shutdown` is accepted for callers that own a shutdown channel but is not
/// consulted: units already dispatched always run to completion.
pub async fn run(
    config: Arc<GlobalConfig>,
    factory: Arc<dyn ProviderFactory>,
    strategy: Arc<dyn LandingStrategy>,
    _shutdown: Option<broadcast::Receiver<()>>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut units = JoinSet::new();

    for credentials in &config.providers {
        let provider = credentials.provider.clone();
        let repositories = match discover(factory.clone(), credentials.clone()).await {
            Ok(repos) => repos,
            Err(reason) => {
                tracing::error!(%provider, error = %reason, "skipping provider");
                summary
                    .skipped_providers
                    .push(SkippedProvider { provider, reason });
                continue;
            }
        };
        tracing::info!(%provider, count = repositories.len(), "dispatching repositories");

        for repository in repositories {
            let strategy = strategy.clone();
            let config = config.clone();
            let credentials = credentials.clone();
            let provider = provider.clone();
            units.spawn_blocking(move || {
                let outcome = strategy
                    .process(&repository, &credentials, &config)
                    .map_err(|e| e.to_string());
                match &outcome {
                    Ok(o) => tracing::info!(repo = %repository, result = o.label(), "processed"),
                    Err(e) => {
                        tracing::error!(url = %repository.clone_url, error = %e, "error processing repository")
                    }
                }
                UnitReport {
                    provider,
                    repository,
                    outcome,
                }
            });
        }
    }

    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(report) => summary.units.push(report),
            Err(e) => {
                tracing::error!(error = %e, "repository unit aborted");
                summary.aborted_units += 1;
            }
        }
    }
    summary
}

/// Builds the provider client and lists its repositories off the runtime.
async fn discover(
    factory: Arc<dyn ProviderFactory>,
    credentials: ProviderCredentials,
) -> Result<Vec<RepositoryRef>, String> {
    let listed = tokio::task::spawn_blocking(move || -> Result<_, String> {
        let client = factory
            .create(&credentials)
            .map_err(|e| format!("error creating provider: {e}"))?;
        client
            .list_repositories()
            .map_err(|e: ProviderError| format!("error listing repositories: {e}"))
    })
    .await;
    listed.map_err(|e| format!("discovery aborted: {e}"))?
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use boneclone_core::ProviderKind;
    use boneclone_providers::RepositoryProvider;

    use super::*;
    use crate::error::{GitError, ProcessError};

    struct ListingProvider {
        repos: Result<Vec<RepositoryRef>, String>,
    }

    impl RepositoryProvider for ListingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::GitLab
        }

        fn list_repositories(&self) -> Result<Vec<RepositoryRef>, ProviderError> {
            self.repos.clone().map_err(ProviderError::Transport)
        }
    }

    /// `github` lists two repositories, `gitlab` fails to list, anything
    /// else fails to construct.
    fn factory() -> Arc<dyn ProviderFactory> {
        Arc::new(
            |c: &ProviderCredentials| -> Result<Box<dyn RepositoryProvider>, ProviderError> {
                let repos = match c.provider.as_str() {
                    "github" => Ok(vec![
                        RepositoryRef::new("a", "https://x/a.git"),
                        RepositoryRef::new("b", "https://x/b.git"),
                    ]),
                    "gitlab" => Err("listing refused".to_string()),
                    other => return Err(ProviderError::Transport(format!("no such host {other}"))),
                };
                Ok(Box::new(ListingProvider { repos }))
            },
        )
    }

    #[derive(Default)]
    struct CountingStrategy {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String, String)>>,
        fail_on: Option<&'static str>,
    }

    impl LandingStrategy for CountingStrategy {
        fn process(
            &self,
            repo: &RepositoryRef,
            credentials: &ProviderCredentials,
            config: &GlobalConfig,
        ) -> Result<UnitOutcome, ProcessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                repo.name.clone(),
                credentials.provider.clone(),
                config.identifier.name.clone(),
            ));
            if self.fail_on == Some(repo.name.as_str()) {
                return Err(ProcessError::Clone(GitError::CommandFailed {
                    command: "git clone".into(),
                    stderr: "denied".into(),
                }));
            }
            Ok(UnitOutcome::NotEligible)
        }
    }

    fn entry(provider: &str) -> ProviderCredentials {
        ProviderCredentials {
            provider: provider.into(),
            username: "bot".into(),
            org: "acme".into(),
            token: String::new(),
            base_url: None,
        }
    }

    fn config(providers: &[&str]) -> Arc<GlobalConfig> {
        let mut config = GlobalConfig::default();
        config.identifier.name = "php".into();
        config.providers = providers.iter().map(|p| entry(p)).collect();
        Arc::new(config)
    }

    #[tokio::test]
    async fn every_listed_repository_is_processed() {
        let strategy = Arc::new(CountingStrategy::default());
        let summary = run(config(&["github"]), factory(), strategy.clone(), None).await;

        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.units.len(), 2);
        assert!(summary.is_clean());
    }

    #[tokio::test]
    async fn listing_failure_skips_only_that_provider() {
        let strategy = Arc::new(CountingStrategy::default());
        let summary = run(config(&["gitlab", "github"]), factory(), strategy.clone(), None).await;

        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.skipped_providers.len(), 1);
        assert_eq!(summary.skipped_providers[0].provider, "gitlab");
        assert!(summary.skipped_providers[0].reason.contains("listing refused"));
    }

    #[tokio::test]
    async fn construction_failure_skips_only_that_provider() {
        let strategy = Arc::new(CountingStrategy::default());
        let summary = run(config(&["bitbucket", "github"]), factory(), strategy.clone(), None).await;

        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
        assert!(summary.skipped_providers[0]
            .reason
            .starts_with("error creating provider"));
    }

    #[tokio::test]
    async fn unit_failures_are_reported_not_propagated() {
        let strategy = Arc::new(CountingStrategy {
            fail_on: Some("a"),
            ..CountingStrategy::default()
        });
        let summary = run(config(&["github"]), factory(), strategy.clone(), None).await;

        assert_eq!(summary.units.len(), 2);
        assert_eq!(summary.failures(), 1);
        let failed = summary
            .units
            .iter()
            .find(|u| u.outcome.is_err())
            .expect("one failure");
        assert_eq!(failed.repository.name, "a");
        assert!(failed.outcome.as_ref().unwrap_err().starts_with("clone: "));
    }

    #[tokio::test]
    async fn config_and_credentials_reach_every_unit() {
        let strategy = Arc::new(CountingStrategy::default());
        run(config(&["github"]), factory(), strategy.clone(), None).await;

        let mut seen = strategy.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            [
                ("a".to_string(), "github".to_string(), "php".to_string()),
                ("b".to_string(), "github".to_string(), "php".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn no_providers_is_an_empty_run() {
        let strategy = Arc::new(CountingStrategy::default());
        let (_tx, rx) = broadcast::channel(1);
        let summary = run(config(&[]), factory(), strategy.clone(), Some(rx)).await;

        assert_eq!(summary, RunSummary::default());
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }
}
