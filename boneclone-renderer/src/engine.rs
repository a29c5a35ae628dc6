//! Tera rendering engine: [`TemplateEngine`] and [`ChangeRequestRenderer`].
//!
//! # Templates
//!
//! | Name                  | Renders                                   |
//! |-----------------------|-------------------------------------------|
//! | `body.md.tera`        | Change-request description                |
//!
//! A `.tera` file with the same relative name inside the configured
//! `templates.dir` replaces the embedded default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use boneclone_core::GlobalConfig;

use crate::context::BodyContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

pub const BODY_TEMPLATE: &str = "body.md.tera";

const TPLS: &[(&str, &str)] = &[(BODY_TEMPLATE, include_str!("templates/body.md.tera"))];

/// Title used when no skeleton name is configured.
pub const DEFAULT_TITLE: &str = "BoneClone update";

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load embedded templates plus any overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the change-request body for `ctx`.
    pub fn render_body(&self, ctx: &BodyContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(BODY_TEMPLATE, &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// BodyBuilder
// ---------------------------------------------------------------------------

/// Renders a change-request description. Providers call this while building
/// the request payload.
pub trait BodyBuilder: Send + Sync {
    fn build(&self, ctx: &BodyContext) -> Result<String, RenderError>;
}

/// `"<skeleton> update"`, or [`DEFAULT_TITLE`] when the skeleton is unnamed.
pub fn change_request_title(skeleton: &str) -> String {
    let skeleton = skeleton.trim();
    if skeleton.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        format!("{skeleton} update")
    }
}

// ---------------------------------------------------------------------------
// ChangeRequestRenderer
// ---------------------------------------------------------------------------

/// The [`BodyBuilder`] used by real runs. Create once and share.
pub struct ChangeRequestRenderer {
    engine: TemplateEngine,
}

impl ChangeRequestRenderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(ChangeRequestRenderer { engine: TemplateEngine::new(None)? })
    }

    /// Embedded templates plus overrides from `templates.dir`.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, RenderError> {
        Ok(ChangeRequestRenderer {
            engine: TemplateEngine::new(config.templates.dir.as_deref())?,
        })
    }
}

impl BodyBuilder for ChangeRequestRenderer {
    fn build(&self, ctx: &BodyContext) -> Result<String, RenderError> {
        self.engine.render_body(ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
