//! Snapshot of the editor state handed to a preview

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast::Node;
use crate::scan;
use crate::selection::TextSelection;

/// Everything a preview needs for one render.
///
/// A context is never modified after construction; each update builds a new
/// one. The AST is shared so that cloning a context stays cheap.
#[derive(Clone, Debug)]
pub struct RenderContext {
    path: Option<PathBuf>,
    markdown: String,
    ast: Arc<Node>,
    selection: TextSelection,
    scroll: (f64, f64),
}

impl RenderContext {
    pub fn new(
        path: Option<PathBuf>,
        markdown: String,
        ast: Arc<Node>,
        selection: TextSelection,
        scroll: (f64, f64),
    ) -> Self {
        Self {
            path,
            markdown,
            ast,
            selection,
            scroll,
        }
    }

    /// Parse `markdown` and build a context with no selection and no scroll
    pub fn from_markdown(path: Option<PathBuf>, markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        let ast = Arc::new(Node::parse(&markdown));
        Self::new(path, markdown, ast, TextSelection::default(), (0.0, 0.0))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn ast(&self) -> &Node {
        &self.ast
    }

    pub fn selection(&self) -> TextSelection {
        self.selection
    }

    pub fn scroll(&self) -> (f64, f64) {
        self.scroll
    }

    /// Fenced code block languages in document order
    pub fn code_languages(&self) -> Vec<String> {
        scan::code_languages(&self.ast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_markdown_parses() {
        let ctx = RenderContext::from_markdown(None, "```rust\nx\n```\n");
        assert_eq!(ctx.code_languages(), vec!["rust"]);
        assert_eq!(ctx.selection(), TextSelection::default());
        assert_eq!(ctx.scroll(), (0.0, 0.0));
        assert!(ctx.path().is_none());
    }

    #[test]
    fn test_clone_shares_ast() {
        let ctx = RenderContext::from_markdown(Some(PathBuf::from("/a/b.md")), "# x\n");
        let copy = ctx.clone();
        assert!(std::ptr::eq(ctx.ast(), copy.ast()));
        assert_eq!(copy.path(), Some(Path::new("/a/b.md")));
    }
}
