//! Configuration loading.
//!
//! # File layout
//!
//! ```yaml
//! providers:
//!   - provider: github
//!     username: skeleton-bot
//!     org: acme
//!     token: ${GITHUB_TOKEN}
//! files:
//!   include: [ci/, .editorconfig]
//!   exclude: [ci/mocks.sh]
//! identifier:
//!   filename: .boneclone.yaml
//!   name: php-skeleton
//! git:
//!   name: Skeleton Bot
//!   email: bot@acme.test
//!   pullRequest: true
//!   targetBranch: main
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit path; used by tests and by `--config`
//! - `load()`: reads [`DEFAULT_CONFIG_FILE`] from the working directory

use std::path::Path;

use crate::error::ConfigError;
use crate::types::GlobalConfig;

/// Config file looked up when no `--config` flag is given.
pub const DEFAULT_CONFIG_FILE: &str = ".boneclone.yaml";

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load, parse and env-expand the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// and line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<GlobalConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    expand_config(config, |name| std::env::var(name).ok())
}

/// `load_at` convenience wrapper for [`DEFAULT_CONFIG_FILE`].
pub fn load() -> Result<GlobalConfig, ConfigError> {
    load_at(Path::new(DEFAULT_CONFIG_FILE))
}

/// Parse YAML without touching the environment.
pub fn parse(contents: &str) -> Result<GlobalConfig, serde_yaml::Error> {
    // An empty document is a config with every field defaulted.
    if contents.trim().is_empty() {
        return Ok(GlobalConfig::default());
    }
    serde_yaml::from_str(contents)
}

// ---------------------------------------------------------------------------
// Environment expansion
// ---------------------------------------------------------------------------

/// Expand `${NAME}` references in every provider entry.
pub fn expand_config<F>(mut config: GlobalConfig, lookup: F) -> Result<GlobalConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for provider in &mut config.providers {
        provider.username = expand_env(&provider.username, "username", &lookup)?;
        provider.org = expand_env(&provider.org, "org", &lookup)?;
        provider.token = expand_env(&provider.token, "token", &lookup)?;
        if let Some(base) = provider.base_url.take() {
            provider.base_url = Some(expand_env(&base, "base_url", &lookup)?);
        }
    }
    Ok(config)
}

/// Replace `${NAME}` with `lookup(NAME)`. `$$` yields a literal `$`; a `$`
/// followed by anything else is kept verbatim.
pub fn expand_env<F>(input: &str, field: &'static str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        if let Some(stripped) = after.strip_prefix('$') {
            out.push('$');
            rest = stripped;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body
                .find('}')
                .ok_or(ConfigError::UnterminatedEnv { field })?;
            let name = &body[..end];
            let value = lookup(name).ok_or_else(|| ConfigError::MissingEnv {
                name: name.to_string(),
            })?;
            out.push_str(&value);
            rest = &body[end + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
