//! # boneclone-renderer
//!
//! Tera-based rendering of change-request titles and descriptions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boneclone_renderer::{BodyBuilder, BodyContext, ChangeRequestRenderer};
//!
//! fn describe(files: Vec<String>) {
//!     if let Ok(renderer) = ChangeRequestRenderer::new() {
//!         let ctx = BodyContext {
//!             skeleton: "php-skeleton".into(),
//!             files_changed: files,
//!             ..BodyContext::default()
//!         };
//!         if let Ok(body) = renderer.build(&ctx) {
//!             println!("{body}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::BodyContext;
pub use engine::{
    change_request_title, BodyBuilder, ChangeRequestRenderer, TemplateEngine, DEFAULT_TITLE,
};
pub use error::RenderError;
