//! Document tree dump

use quire_core::{PreviewType, RenderContext, TextSelection};

use super::{PreviewNode, PreviewSurface};

#[derive(Debug, Default)]
pub struct AstPreview {
    text: String,
}

impl AstPreview {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSurface for AstPreview {
    fn preview_type(&self) -> PreviewType {
        PreviewType::Ast
    }

    fn node(&self) -> PreviewNode<'_> {
        PreviewNode::Text(&self.text)
    }

    fn update(&mut self, context: &RenderContext, _html: &str) {
        self.text = context.ast().dump();
    }

    fn scroll_y(&mut self, _value: f64) {}

    fn editor_selection_changed(&mut self, _selection: TextSelection) {}
}
