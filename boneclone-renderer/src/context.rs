//! Body context: serializable rendering payload for one change request.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Everything a change-request body template can refer to.
///
/// The skeleton name travels with each request rather than living in any
/// process-wide state, so concurrent units never observe each other's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyContext {
    /// Skeleton display name; empty when unset.
    pub skeleton: String,
    /// Repository the request is opened against.
    pub repository: String,
    pub base_branch: String,
    pub head_branch: String,
    /// Paths staged by the landing, relative to the repository root.
    pub files_changed: Vec<String>,
    pub original_author: Option<String>,
}

impl BodyContext {
    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
