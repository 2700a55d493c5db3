//! Quire Core - Document model, preview selection and highlighting dependencies
//!
//! This crate contains the logic of the editor/preview pipeline that does not
//! depend on any render target:
//! - Document model with Rope-based text storage (size ceiling, binary files)
//! - Markdown parsing into a small document tree and HTML rendering
//! - Fenced code block scanning and highlighter dependency resolution
//! - Preview type selection
//! - Render context snapshots
//! - Configuration management

pub mod ast;
pub mod config;
pub mod context;
pub mod deps;
pub mod doc;
pub mod hex;
pub mod markdown;
pub mod preview_type;
pub mod scan;
pub mod selection;

// Re-export commonly used types
pub use ast::Node;
pub use config::Config;
pub use context::RenderContext;
pub use deps::DependencyMap;
pub use doc::{Document, DocumentKind};
pub use preview_type::{PreviewType, ViewFlags};
pub use selection::TextSelection;
