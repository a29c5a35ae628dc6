//! Azure DevOps client: every repository of every project in an organisation.
//!
//! The `org` credential is the organisation URL (`https://dev.azure.com/acme`).
//! Repository names are reported as `Project/Repository` so that opening a
//! pull request can recover both halves later.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use boneclone_core::{ChangeRequestHandle, ProviderCredentials, ProviderKind, RepositoryRef};
use boneclone_renderer::BodyBuilder;

use crate::error::ProviderError;
use crate::http::{decode, Auth, HttpClient};
use crate::provider::{require, ChangeRequest, ChangeRequestProvider, RepositoryProvider};

pub const API_VERSION: &str = "7.1";

#[derive(Debug, Deserialize)]
struct List<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    name: String,
    remote_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPullRequest<'a> {
    source_ref_name: String,
    target_ref_name: String,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    pull_request_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reviewer<'a> {
    unique_name: &'a str,
}

pub struct AzureProvider {
    http: HttpClient,
    base: String,
}

fn segment(value: &str) -> String {
    value.replace('%', "%25").replace(' ', "%20").replace('/', "%2F")
}

fn branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{branch}")
    }
}

/// Splits `Project/Repository`; both halves must be non-empty.
pub fn split_repository(name: &str) -> Result<(&str, &str), ProviderError> {
    match name.split_once('/') {
        Some((project, repo)) if !project.is_empty() && !repo.is_empty() => Ok((project, repo)),
        _ => Err(ProviderError::InvalidRepository(name.to_string())),
    }
}

impl AzureProvider {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProviderError> {
        let org = require(&credentials.org, "org")?;
        let base = credentials
            .base_url
            .as_deref()
            .unwrap_or(org)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http: HttpClient::new(&base, Auth::BasicPat(credentials.token.clone()), timeout),
            base,
        })
    }

    fn repositories_url(&self, project: &str) -> String {
        self.http
            .url(&format!("/{}/_apis/git/repositories", segment(project)))
    }

    fn list_projects(&self) -> Result<Vec<Project>, ProviderError> {
        let url = self.http.url("/_apis/projects");
        let projects: List<Project> = decode(self.http.get(&url, &[("api-version", API_VERSION)])?)?;
        Ok(projects.value)
    }
}

impl RepositoryProvider for AzureProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    fn list_repositories(&self) -> Result<Vec<RepositoryRef>, ProviderError> {
        let mut out = Vec::new();
        for project in self.list_projects()? {
            let url = self.repositories_url(&project.name);
            let repos: List<Repository> =
                decode(self.http.get(&url, &[("api-version", API_VERSION)])?)?;
            out.extend(repos.value.into_iter().map(|r| {
                RepositoryRef::new(format!("{}/{}", project.name, r.name), r.remote_url)
            }));
        }
        tracing::debug!(org = %self.base, count = out.len(), "listed Azure DevOps repositories");
        Ok(out)
    }

    fn change_requests(&self) -> Option<&dyn ChangeRequestProvider> {
        Some(self)
    }
}

impl ChangeRequestProvider for AzureProvider {
    fn open_change_request(
        &self,
        request: &ChangeRequest<'_>,
        body: &dyn BodyBuilder,
    ) -> Result<ChangeRequestHandle, ProviderError> {
        let (project, repo) = split_repository(request.repository)?;
        let rendered = request.render_body(body)?;
        let url = format!(
            "{}/{}/pullrequests",
            self.repositories_url(project),
            segment(repo)
        );
        let payload = NewPullRequest {
            source_ref_name: branch_ref(request.head_branch),
            target_ref_name: branch_ref(request.base_branch),
            title: request.title,
            description: &rendered,
        };
        let pr: PullRequest = decode(self.http.send(
            "POST",
            &url,
            &[("api-version", API_VERSION)],
            &payload,
        )?)?;
        Ok(ChangeRequestHandle {
            id: pr.pull_request_id,
            url: format!(
                "{}/{}/_git/{}/pullrequest/{}",
                self.base,
                segment(project),
                segment(repo),
                pr.pull_request_id
            ),
        })
    }

    fn assign_reviewers(
        &self,
        repository: &str,
        handle: &ChangeRequestHandle,
        reviewers: &[String],
    ) -> Result<(), ProviderError> {
        if reviewers.is_empty() {
            return Ok(());
        }
        let (project, repo) = split_repository(repository)?;
        let url = format!(
            "{}/{}/pullRequests/{}/reviewers",
            self.repositories_url(project),
            segment(repo),
            handle.id
        );
        let payload: Vec<Reviewer<'_>> = reviewers
            .iter()
            .map(|name| Reviewer { unique_name: name })
            .collect();
        self.http
            .send("POST", &url, &[("api-version", API_VERSION)], &payload)?;
        Ok(())
    }
}
