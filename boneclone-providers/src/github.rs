//! GitHub REST client: organisation repositories and pull requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use boneclone_core::{ChangeRequestHandle, ProviderCredentials, ProviderKind, RepositoryRef};
use boneclone_renderer::BodyBuilder;

use crate::error::ProviderError;
use crate::http::{decode, Auth, HttpClient};
use crate::provider::{require, ChangeRequest, ChangeRequestProvider, RepositoryProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct Repo {
    name: String,
    clone_url: String,
}

#[derive(Debug, Serialize)]
struct NewPull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct Pull {
    number: u64,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    reviewers: &'a [String],
}

pub struct GitHubProvider {
    http: HttpClient,
    org: String,
}

impl GitHubProvider {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProviderError> {
        let org = require(&credentials.org, "org")?.to_string();
        let base = credentials.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            http: HttpClient::new(base, Auth::Bearer(credentials.token.clone()), timeout),
            org,
        })
    }
}

impl RepositoryProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn list_repositories(&self) -> Result<Vec<RepositoryRef>, ProviderError> {
        let url = self.http.url(&format!("/orgs/{}/repos", self.org));
        let per_page = PER_PAGE.to_string();
        let mut out = Vec::new();
        let mut page = 1usize;
        loop {
            let page_str = page.to_string();
            let response = self
                .http
                .get(&url, &[("per_page", per_page.as_str()), ("page", page_str.as_str())])?;
            let repos: Vec<Repo> = decode(response)?;
            let fetched = repos.len();
            out.extend(
                repos
                    .into_iter()
                    .map(|r| RepositoryRef::new(r.name, r.clone_url)),
            );
            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }
        tracing::debug!(org = %self.org, count = out.len(), "listed GitHub repositories");
        Ok(out)
    }

    fn change_requests(&self) -> Option<&dyn ChangeRequestProvider> {
        Some(self)
    }
}

impl ChangeRequestProvider for GitHubProvider {
    fn open_change_request(
        &self,
        request: &ChangeRequest<'_>,
        body: &dyn BodyBuilder,
    ) -> Result<ChangeRequestHandle, ProviderError> {
        let rendered = request.render_body(body)?;
        let url = self
            .http
            .url(&format!("/repos/{}/{}/pulls", self.org, request.repository));
        let payload = NewPull {
            title: request.title,
            head: request.head_branch,
            base: request.base_branch,
            body: &rendered,
        };
        let pull: Pull = decode(self.http.send("POST", &url, &[], &payload)?)?;
        Ok(ChangeRequestHandle {
            id: pull.number,
            url: pull.html_url,
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
        let url = self.http.url(&format!(
            "/repos/{}/{}/pulls/{}/requested_reviewers",
            self.org, repository, handle.id
        ));
        self.http
            .send("POST", &url, &[], &ReviewRequest { reviewers })?;
        Ok(())
    }
}
