//! GitLab REST client: group projects (including subgroups) and merge requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use boneclone_core::{ChangeRequestHandle, ProviderCredentials, ProviderKind, RepositoryRef};
use boneclone_renderer::BodyBuilder;

use crate::error::ProviderError;
use crate::http::{decode, Auth, HttpClient};
use crate::provider::{require, ChangeRequest, ChangeRequestProvider, RepositoryProvider};

pub const DEFAULT_BASE_URL: &str = "https://gitlab.com/api/v4";

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct Project {
    path: String,
    #[serde(default)]
    path_with_namespace: Option<String>,
    http_url_to_repo: String,
}

#[derive(Debug, Serialize)]
struct NewMergeRequest<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct User {
    id: u64,
}

#[derive(Debug, Serialize)]
struct ReviewerUpdate<'a> {
    reviewer_ids: &'a [u64],
}

pub struct GitLabProvider {
    http: HttpClient,
    group: String,
}

/// Namespaced paths are passed as a single URL-encoded path segment.
/// GitLab paths are limited to `[A-Za-z0-9_.-]` plus `/`.
fn encode_path(path: &str) -> String {
    path.replace('/', "%2F")
}

/// Project path relative to `group`, keeping any subgroups in between.
/// Falls back to the bare `path` when the namespace is not under `group`.
fn relative_path(group: &str, project: &Project) -> String {
    let Some(full) = project.path_with_namespace.as_deref() else {
        return project.path.clone();
    };
    let rest = full.get(group.len()..).and_then(|r| r.strip_prefix('/'));
    match (full.get(..group.len()), rest) {
        (Some(head), Some(rest)) if head.eq_ignore_ascii_case(group) && !rest.is_empty() => {
            rest.to_string()
        }
        _ => project.path.clone(),
    }
}

impl GitLabProvider {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProviderError> {
        let group = require(&credentials.org, "org")?.to_string();
        let base = credentials.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            http: HttpClient::new(base, Auth::PrivateToken(credentials.token.clone()), timeout),
            group,
        })
    }

    fn project_id(&self, repository: &str) -> String {
        encode_path(&format!("{}/{}", self.group, repository))
    }

    fn resolve_user(&self, username: &str) -> Result<Option<u64>, ProviderError> {
        let url = self.http.url("/users");
        let users: Vec<User> = decode(self.http.get(&url, &[("username", username)])?)?;
        Ok(users.first().map(|u| u.id))
    }
}

impl RepositoryProvider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn list_repositories(&self) -> Result<Vec<RepositoryRef>, ProviderError> {
        let url = self
            .http
            .url(&format!("/groups/{}/projects", encode_path(&self.group)));
        let mut out = Vec::new();
        let mut page = String::from("1");
        loop {
            let response = self.http.get(
                &url,
                &[
                    ("include_subgroups", "true"),
                    ("per_page", PER_PAGE),
                    ("page", page.as_str()),
                ],
            )?;
            let next = response
                .header("X-Next-Page")
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            let projects: Vec<Project> = decode(response)?;
            out.extend(projects.into_iter().map(|p| {
                let name = relative_path(&self.group, &p);
                RepositoryRef::new(name, p.http_url_to_repo)
            }));
            if next.is_empty() {
                break;
            }
            page = next;
        }
        tracing::debug!(group = %self.group, count = out.len(), "listed GitLab projects");
        Ok(out)
    }

    fn change_requests(&self) -> Option<&dyn ChangeRequestProvider> {
        Some(self)
    }
}

impl ChangeRequestProvider for GitLabProvider {
    fn open_change_request(
        &self,
        request: &ChangeRequest<'_>,
        body: &dyn BodyBuilder,
    ) -> Result<ChangeRequestHandle, ProviderError> {
        let rendered = request.render_body(body)?;
        let url = self.http.url(&format!(
            "/projects/{}/merge_requests",
            self.project_id(request.repository)
        ));
        let payload = NewMergeRequest {
            source_branch: request.head_branch,
            target_branch: request.base_branch,
            title: request.title,
            description: &rendered,
        };
        let mr: MergeRequest = decode(self.http.send("POST", &url, &[], &payload)?)?;
        Ok(ChangeRequestHandle {
            id: mr.iid,
            url: mr.web_url,
        })
    }

    fn assign_reviewers(
        &self,
        repository: &str,
        handle: &ChangeRequestHandle,
        reviewers: &[String],
    ) -> Result<(), ProviderError> {
        let mut ids = Vec::with_capacity(reviewers.len());
        for username in reviewers {
            match self.resolve_user(username)? {
                Some(id) => ids.push(id),
                None => tracing::warn!(%username, "GitLab user not found; skipping reviewer"),
            }
        }
        if ids.is_empty() {
            return Ok(());
        }
        let url = self.http.url(&format!(
            "/projects/{}/merge_requests/{}",
            self.project_id(repository),
            handle.id
        ));
        self.http
            .send("PUT", &url, &[], &ReviewerUpdate { reviewer_ids: &ids })?;
        Ok(())
    }
}
