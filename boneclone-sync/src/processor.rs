//! Landing strategies: what happens to one eligible repository.
//!
//! - [`DirectStrategy`] pushes the skeleton files straight to the target branch.
//! - [`RequestStrategy`] pushes to a fresh `boneclone/update-*` branch and opens
//!   a change request against the target branch.
//!
//! Both are assembled by [`StrategyBuilder`], which rejects missing
//! collaborators at construction time instead of at first use.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use boneclone_core::{ChangeRequestHandle, GlobalConfig, ProviderCredentials, RepositoryRef};
use boneclone_providers::{ChangeRequest, ProviderFactory};
use boneclone_renderer::{change_request_title, BodyBuilder};

use crate::error::{ProcessError, WiringError};
use crate::git::{source_author, RepositoryOperations};

pub const HEAD_BRANCH_PREFIX: &str = "boneclone/update-";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a unit did to its repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Marker absent, malformed, or not accepting this skeleton.
    NotEligible,
    /// New commits were pushed to the target branch.
    Pushed { branch: String, files: Vec<String> },
    /// The target branch already matched the skeleton.
    UpToDate { branch: String },
    ChangeRequestOpened {
        branch: String,
        handle: ChangeRequestHandle,
    },
    /// Request mode produced no commit, so no change request was opened.
    NothingToPropose { branch: String },
}

impl UnitOutcome {
    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            UnitOutcome::NotEligible => "not eligible",
            UnitOutcome::Pushed { .. } => "pushed",
            UnitOutcome::UpToDate { .. } => "up to date",
            UnitOutcome::ChangeRequestOpened { .. } => "change request",
            UnitOutcome::NothingToPropose { .. } => "nothing to propose",
        }
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Processes one repository. Called concurrently from blocking threads.
pub trait LandingStrategy: Send + Sync {
    fn process(
        &self,
        repo: &RepositoryRef,
        credentials: &ProviderCredentials,
        config: &GlobalConfig,
    ) -> Result<UnitOutcome, ProcessError>;
}

/// `boneclone/update-<UTC YYYYmmdd-HHMMSS>`.
pub fn head_branch_name(now: DateTime<Utc>) -> String {
    format!("{HEAD_BRANCH_PREFIX}{}", now.format("%Y%m%d-%H%M%S"))
}

/// Clone, check eligibility, land on the target branch.
pub struct DirectStrategy {
    operations: Arc<dyn RepositoryOperations>,
}

impl LandingStrategy for DirectStrategy {
    fn process(
        &self,
        repo: &RepositoryRef,
        credentials: &ProviderCredentials,
        config: &GlobalConfig,
    ) -> Result<UnitOutcome, ProcessError> {
        let tree = self
            .operations
            .clone_repository(repo, credentials)
            .map_err(ProcessError::Clone)?;
        let eligibility = self
            .operations
            .check_eligibility(&tree, config)
            .map_err(ProcessError::Validate)?;
        if !eligibility.eligible {
            return Ok(UnitOutcome::NotEligible);
        }

        let branch = config.git.target_branch_or_default();
        let report = self
            .operations
            .stage_and_land(&tree, config, credentials, branch)
            .map_err(ProcessError::Copy)?;

        if report.commits == 0 {
            return Ok(UnitOutcome::UpToDate {
                branch: report.branch,
            });
        }
        Ok(UnitOutcome::Pushed {
            branch: report.branch,
            files: report.files,
        })
    }
}

/// Clone, check eligibility, land on a fresh head branch, open a change request.
pub struct RequestStrategy {
    operations: Arc<dyn RepositoryOperations>,
    factory: Arc<dyn ProviderFactory>,
    renderer: Arc<dyn BodyBuilder>,
    original_author: Option<String>,
    clock: fn() -> DateTime<Utc>,
}

impl LandingStrategy for RequestStrategy {
    fn process(
        &self,
        repo: &RepositoryRef,
        credentials: &ProviderCredentials,
        config: &GlobalConfig,
    ) -> Result<UnitOutcome, ProcessError> {
        let tree = self
            .operations
            .clone_repository(repo, credentials)
            .map_err(ProcessError::Clone)?;
        let eligibility = self
            .operations
            .check_eligibility(&tree, config)
            .map_err(ProcessError::Validate)?;
        if !eligibility.eligible {
            return Ok(UnitOutcome::NotEligible);
        }

        let head = head_branch_name((self.clock)());
        let report = self
            .operations
            .stage_and_land(&tree, config, credentials, &head)
            .map_err(ProcessError::Copy)?;
        if report.commits == 0 {
            tracing::info!(repo = %repo, branch = %head, "no changes; not opening a change request");
            return Ok(UnitOutcome::NothingToPropose { branch: head });
        }

        let provider = self
            .factory
            .create(credentials)
            .map_err(ProcessError::Provider)?;
        let change_requests = provider
            .change_requests()
            .ok_or(ProcessError::Unsupported)?;

        let base = config.git.target_branch_or_default();
        let skeleton = config.skeleton_name();
        let title = change_request_title(skeleton);
        let request = ChangeRequest {
            repository: &repo.name,
            base_branch: base,
            head_branch: &head,
            title: &title,
            skeleton,
            files_changed: &report.files,
            original_author: self.original_author.as_deref(),
        };
        let handle = change_requests
            .open_change_request(&request, self.renderer.as_ref())
            .map_err(ProcessError::CreateChangeRequest)?;
        tracing::info!(repo = %repo, url = %handle.url, "opened change request");

        for reviewer in eligibility.descriptor.reviewer_names() {
            let reviewers = [reviewer.to_string()];
            if let Err(e) = change_requests.assign_reviewers(&repo.name, &handle, &reviewers) {
                tracing::warn!(repo = %repo, reviewer, error = %e, "failed to assign reviewer");
            }
        }

        Ok(UnitOutcome::ChangeRequestOpened {
            branch: head,
            handle,
        })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Wires collaborators into the strategy selected by `git.pullRequest`.
#[derive(Default)]
pub struct StrategyBuilder {
    operations: Option<Arc<dyn RepositoryOperations>>,
    factory: Option<Arc<dyn ProviderFactory>>,
    renderer: Option<Arc<dyn BodyBuilder>>,
    clock: Option<fn() -> DateTime<Utc>>,
}

impl StrategyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(mut self, operations: Arc<dyn RepositoryOperations>) -> Self {
        self.operations = Some(operations);
        self
    }

    pub fn provider_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn BodyBuilder>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Time source for head branch names. Defaults to [`Utc::now`].
    pub fn clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self, config: &GlobalConfig) -> Result<Arc<dyn LandingStrategy>, WiringError> {
        let operations = self.operations.ok_or(WiringError::MissingOperations)?;
        if !config.git.pull_request {
            return Ok(Arc::new(DirectStrategy { operations }));
        }

        let factory = self.factory.ok_or(WiringError::MissingProviderFactory)?;
        let renderer = self.renderer.ok_or(WiringError::MissingRenderer)?;
        Ok(Arc::new(RequestStrategy {
            operations,
            factory,
            renderer,
            original_author: source_author(&config.files.source_root),
            clock: self.clock.unwrap_or(Utc::now),
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
