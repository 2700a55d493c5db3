//! Preview delegated to a renderer supplied by the host

use quire_core::{PreviewType, RenderContext, TextSelection};

use super::{PreviewNode, PreviewSurface};

/// A host-side renderer, e.g. an external browser or a print preview
pub trait ExternalRenderer {
    fn update(&mut self, context: &RenderContext, html: &str);

    fn node(&self) -> PreviewNode<'_> {
        PreviewNode::Empty
    }

    fn scroll_y(&mut self, _value: f64) {}

    fn editor_selection_changed(&mut self, _selection: TextSelection) {}
}

pub struct ExternalPreview {
    renderer: Box<dyn ExternalRenderer>,
}

impl ExternalPreview {
    pub fn new(renderer: Box<dyn ExternalRenderer>) -> Self {
        Self { renderer }
    }
}

impl PreviewSurface for ExternalPreview {
    fn preview_type(&self) -> PreviewType {
        PreviewType::External
    }

    fn node(&self) -> PreviewNode<'_> {
        self.renderer.node()
    }

    fn update(&mut self, context: &RenderContext, html: &str) {
        self.renderer.update(context, html);
    }

    fn scroll_y(&mut self, value: f64) {
        self.renderer.scroll_y(value);
    }

    fn editor_selection_changed(&mut self, selection: TextSelection) {
        self.renderer.editor_selection_changed(selection);
    }
}
