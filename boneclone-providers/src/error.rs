//! Error types for boneclone-providers.

use thiserror::Error;

use boneclone_core::ConfigError;
use boneclone_renderer::RenderError;

/// All errors that can arise while talking to a source-control host.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Bad provider entry (unknown tag and similar).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required provider entry field is empty.
    #[error("provider entry is missing `{0}`")]
    MissingField(&'static str),

    /// The host answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Http { status: u16, url: String, body: String },

    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The change-request body could not be rendered.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A repository name did not have the shape the provider needs.
    #[error("invalid repository name: {0}")]
    InvalidRepository(String),
}

impl From<ureq::Error> for ProviderError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let url = response.get_url().to_string();
                let body = response.into_string().unwrap_or_default();
                ProviderError::Http { status, url, body }
            }
            ureq::Error::Transport(transport) => ProviderError::Transport(transport.to_string()),
        }
    }
}
