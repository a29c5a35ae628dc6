//! Thin blocking HTTP layer shared by every provider client.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProviderError;

/// Per-request timeout. Requests are never retried.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("boneclone/", env!("CARGO_PKG_VERSION"));

/// How a host expects the token to be presented.
#[derive(Clone)]
pub(crate) enum Auth {
    /// `Authorization: Bearer <token>` (GitHub).
    Bearer(String),
    /// `PRIVATE-TOKEN: <token>` (GitLab).
    PrivateToken(String),
    /// `Authorization: Basic base64(":" + token)` (Azure DevOps PAT).
    BasicPat(String),
}

impl Auth {
    fn apply(&self, request: ureq::Request) -> ureq::Request {
        match self {
            Auth::Bearer(token) if !token.is_empty() => {
                request.set("Authorization", &format!("Bearer {token}"))
            }
            Auth::PrivateToken(token) if !token.is_empty() => request.set("PRIVATE-TOKEN", token),
            Auth::BasicPat(token) if !token.is_empty() => {
                let encoded = STANDARD.encode(format!(":{token}"));
                request.set("Authorization", &format!("Basic {encoded}"))
            }
            _ => request,
        }
    }
}

/// Agent + base URL + credentials for one provider entry.
#[derive(Clone)]
pub(crate) struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    auth: Auth,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str, auth: Auth, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// `path` must start with `/`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, url)
            .set("Accept", "application/json");
        self.auth.apply(request)
    }

    pub(crate) fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<ureq::Response, ProviderError> {
        let mut request = self.request("GET", url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        tracing::debug!(%url, "GET");
        Ok(request.call()?)
    }

    pub(crate) fn send<B: Serialize>(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<ureq::Response, ProviderError> {
        let mut request = self.request(method, url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        tracing::debug!(%url, method, "sending");
        Ok(request.send_json(body)?)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ProviderError> {
    response
        .into_json::<T>()
        .map_err(|e| ProviderError::Decode(e.to_string()))
}
