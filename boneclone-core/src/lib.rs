//! BoneClone core library: descriptor model, configuration loading, errors.
//!
//! - [`types`]: configuration, repository and change-request data types
//! - [`config`]: YAML loading and `${ENV}` expansion
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    ChangeRequestHandle, FileConfig, GitConfig, GlobalConfig, IdentifierConfig, ProviderCredentials,
    ProviderKind, RemoteDescriptor, RepositoryRef, TemplateConfig,
};
