//! Preview surfaces
//!
//! A surface is whatever sits next to the editor: the rendered web page, the
//! generated HTML as text, a dump of the document tree, or a host-provided
//! external renderer. The session owns one surface per preview type and
//! creates them on first use.

pub mod ast;
pub mod external;
pub mod headless;
pub mod source;
pub mod web;

use quire_core::{PreviewType, RenderContext, TextSelection};

pub use ast::AstPreview;
pub use external::{ExternalPreview, ExternalRenderer};
pub use headless::{HeadlessHost, HeadlessTarget, TargetLog};
pub use source::SourcePreview;
pub use web::{LoadOutcome, LoadState, LoadTicket, RenderTarget, WebPreview};

/// What a surface currently displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewNode<'a> {
    /// Nothing rendered yet
    Empty,
    /// A complete HTML document
    Html(&'a str),
    /// Plain text
    Text(&'a str),
}

impl<'a> PreviewNode<'a> {
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            PreviewNode::Empty => None,
            PreviewNode::Html(s) | PreviewNode::Text(s) => Some(s),
        }
    }
}

/// A render target for one preview type
pub trait PreviewSurface {
    fn preview_type(&self) -> PreviewType;

    /// Current display content
    fn node(&self) -> PreviewNode<'_>;

    /// Render `context`; `html` is the markdown rendered to an HTML fragment
    fn update(&mut self, context: &RenderContext, html: &str);

    /// The editor scrolled to `value`
    fn scroll_y(&mut self, value: f64);

    /// The editor selection changed
    fn editor_selection_changed(&mut self, selection: TextSelection);

    /// Access to the web surface, which alone has a load cycle
    fn as_web_mut(&mut self) -> Option<&mut WebPreview> {
        None
    }
}

/// Host capabilities the engine needs to build surfaces
pub trait PreviewHost {
    /// A fresh render target for a web preview. `events` delivers load
    /// completions back to the owning session.
    fn create_render_target(
        &self,
        events: crossbeam_channel::Sender<crate::SessionEvent>,
    ) -> Box<dyn RenderTarget>;

    /// An external renderer, if the host has one
    fn external_renderer(&self) -> Option<Box<dyn ExternalRenderer>> {
        None
    }

    /// Whether [`PreviewHost::external_renderer`] can produce a renderer
    fn has_external_renderer(&self) -> bool {
        false
    }
}
