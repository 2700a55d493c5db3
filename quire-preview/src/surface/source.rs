//! Generated HTML shown as plain text

use quire_core::{PreviewType, RenderContext, TextSelection};

use super::{PreviewNode, PreviewSurface};

#[derive(Debug, Default)]
pub struct SourcePreview {
    text: String,
}

impl SourcePreview {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSurface for SourcePreview {
    fn preview_type(&self) -> PreviewType {
        PreviewType::Source
    }

    fn node(&self) -> PreviewNode<'_> {
        PreviewNode::Text(&self.text)
    }

    fn update(&mut self, _context: &RenderContext, html: &str) {
        self.text.clear();
        self.text.push_str(html);
    }

    fn scroll_y(&mut self, _value: f64) {}

    fn editor_selection_changed(&mut self, _selection: TextSelection) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::markdown::render_html;

    #[test]
    fn test_shows_generated_html() {
        let ctx = RenderContext::from_markdown(None, "*hi*\n");
        let mut preview = SourcePreview::new();
        preview.update(&ctx, &render_html(ctx.markdown()));
        assert_eq!(preview.node(), PreviewNode::Text("<p><em>hi</em></p>\n"));
    }
}
