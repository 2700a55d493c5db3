//! Rendered HTML preview
//!
//! The web surface hands a complete HTML document to a [`RenderTarget`] (an
//! embedded browser view) and tracks the resulting load cycle. Scripted
//! actions against the page, scrolling and selection highlighting, only make
//! sense once the page has loaded; while a load is in flight they are queued
//! and replayed in order when it succeeds.

use log::{debug, warn};
use quire_core::{DependencyMap, PreviewType, RenderContext, TextSelection};
use std::collections::VecDeque;
use std::rc::Rc;

use super::{PreviewNode, PreviewSurface};
use crate::assets::AssetLocator;
use crate::html::{self, DocumentParts};

/// Load cycle of the render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Identifies one load; completions carrying an older ticket are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Succeeded,
    Failed,
}

/// Scripting bridge to an embedded browser view
pub trait RenderTarget {
    /// Start loading `html`. Completion is reported to the owning surface
    /// through [`WebPreview::load_finished`] with the same ticket, never
    /// synchronously from within this call.
    fn load_content(&mut self, html: &str, ticket: LoadTicket);

    /// Evaluate `script` in the loaded page, returning a numeric result if any
    fn execute_script(&mut self, script: &str) -> Option<f64>;
}

type DeferredAction = Box<dyn FnOnce(&mut dyn RenderTarget)>;

pub struct WebPreview {
    target: Box<dyn RenderTarget>,
    assets: Rc<dyn AssetLocator>,
    dependencies: Rc<DependencyMap>,
    additional_css: String,
    state: LoadState,
    ticket: u64,
    deferred: VecDeque<DeferredAction>,
    last_scroll: (i64, i64),
    last_selection: Option<TextSelection>,
    /// Document of the load in flight
    loading: String,
    /// Last successfully loaded document
    shown: String,
}

impl WebPreview {
    pub fn new(
        target: Box<dyn RenderTarget>,
        assets: Rc<dyn AssetLocator>,
        dependencies: Rc<DependencyMap>,
        additional_css: impl Into<String>,
    ) -> Self {
        Self {
            target,
            assets,
            dependencies,
            additional_css: additional_css.into(),
            state: LoadState::Idle,
            ticket: 0,
            deferred: VecDeque::new(),
            last_scroll: (0, 0),
            last_selection: None,
            loading: String::new(),
            shown: String::new(),
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Ticket of the most recent load
    pub fn current_ticket(&self) -> LoadTicket {
        LoadTicket(self.ticket)
    }

    /// Number of actions waiting for the load to finish
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Build the document for `context` without loading it
    pub fn assemble(&self, context: &RenderContext, html: &str) -> String {
        let languages = context.code_languages();
        let selection = self.last_selection.unwrap_or(context.selection());

        DocumentParts {
            stylesheet: self.assets.stylesheet(),
            additional_css: &self.additional_css,
            runtime_script: self.assets.runtime_script(),
            highlighting: html::highlighting_tags(
                self.assets.as_ref(),
                &self.dependencies,
                &languages,
            ),
            base_href: context.path().and_then(html::base_href),
            scroll: self.last_scroll,
            body: html,
            highlight_offset: selection.end(),
        }
        .assemble()
    }

    /// Report the end of a load cycle. Completions for superseded loads are ignored.
    pub fn load_finished(&mut self, ticket: LoadTicket, outcome: LoadOutcome) {
        if self.state != LoadState::Loading || ticket != self.current_ticket() {
            debug!("Ignoring stale load completion {:?} ({:?})", ticket, outcome);
            return;
        }

        match outcome {
            LoadOutcome::Succeeded => {
                self.state = LoadState::Succeeded;
                self.shown = std::mem::take(&mut self.loading);

                let actions = std::mem::take(&mut self.deferred);
                for action in actions {
                    action(self.target.as_mut());
                }
            }
            LoadOutcome::Failed => {
                warn!("Preview load {:?} failed, keeping previous content", ticket);
                self.state = LoadState::Failed;
                self.loading.clear();
                // Queued actions target a page that never appeared
                self.deferred.clear();
            }
        }
    }

    fn run_when_loaded(&mut self, action: DeferredAction) {
        if self.state == LoadState::Loading {
            self.deferred.push_back(action);
        } else {
            action(self.target.as_mut());
        }
    }

    fn read_scroll(&mut self) -> (i64, i64) {
        let x = self.target.execute_script("window.scrollX").unwrap_or(0.0);
        let y = self.target.execute_script("window.scrollY").unwrap_or(0.0);
        (x as i64, y as i64)
    }
}

impl PreviewSurface for WebPreview {
    fn preview_type(&self) -> PreviewType {
        PreviewType::Web
    }

    fn node(&self) -> PreviewNode<'_> {
        if self.shown.is_empty() {
            PreviewNode::Empty
        } else {
            PreviewNode::Html(&self.shown)
        }
    }

    fn update(&mut self, context: &RenderContext, html: &str) {
        // Mid-load the page reports 0/0, keep the last real position
        if self.state != LoadState::Loading {
            self.last_scroll = self.read_scroll();
        }
        self.last_selection = Some(context.selection());

        let document = self.assemble(context, html);

        self.ticket += 1;
        self.state = LoadState::Loading;
        self.target.load_content(&document, LoadTicket(self.ticket));
        self.loading = document;
    }

    fn scroll_y(&mut self, value: f64) {
        self.run_when_loaded(Box::new(move |target| {
            target.execute_script(&html::scroll_script(value));
        }));
    }

    fn editor_selection_changed(&mut self, selection: TextSelection) {
        if self.last_selection == Some(selection) {
            return;
        }
        self.last_selection = Some(selection);

        self.run_when_loaded(Box::new(move |target| {
            target.execute_script(&html::highlight_script(selection.end()));
        }));
    }

    fn as_web_mut(&mut self) -> Option<&mut WebPreview> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirAssets;
    use quire_core::Node;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorded {
        loads: Vec<(LoadTicket, String)>,
        scripts: Vec<String>,
        scroll: (f64, f64),
    }

    struct RecordingTarget(Rc<RefCell<Recorded>>);

    impl RenderTarget for RecordingTarget {
        fn load_content(&mut self, html: &str, ticket: LoadTicket) {
            self.0.borrow_mut().loads.push((ticket, html.to_string()));
        }

        fn execute_script(&mut self, script: &str) -> Option<f64> {
            let mut rec = self.0.borrow_mut();
            match script {
                "window.scrollX" => Some(rec.scroll.0),
                "window.scrollY" => Some(rec.scroll.1),
                _ => {
                    rec.scripts.push(script.to_string());
                    None
                }
            }
        }
    }

    fn preview() -> (WebPreview, Rc<RefCell<Recorded>>) {
        let rec = Rc::new(RefCell::new(Recorded::default()));
        let preview = WebPreview::new(
            Box::new(RecordingTarget(rec.clone())),
            Rc::new(DirAssets::new("/nonexistent/assets")),
            Rc::new(DependencyMap::empty()),
            "",
        );
        (preview, rec)
    }

    fn ctx(markdown: &str) -> RenderContext {
        RenderContext::from_markdown(None, markdown)
    }

    fn scripts(rec: &Rc<RefCell<Recorded>>) -> Vec<String> {
        rec.borrow().scripts.clone()
    }

    #[test]
    fn test_update_starts_load() {
        let (mut preview, rec) = preview();
        assert_eq!(preview.load_state(), LoadState::Idle);

        preview.update(&ctx("# hi"), "<h1>hi</h1>\n");
        assert_eq!(preview.load_state(), LoadState::Loading);
        assert_eq!(rec.borrow().loads.len(), 1);
        assert!(rec.borrow().loads[0].1.contains("<h1>hi</h1>"));
        assert_eq!(preview.node(), PreviewNode::Empty);

        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);
        assert_eq!(preview.load_state(), LoadState::Succeeded);
        assert!(preview.node().as_str().unwrap().contains("<h1>hi</h1>"));
    }

    #[test]
    fn test_scroll_while_loading_is_deferred() {
        let (mut preview, rec) = preview();
        preview.update(&ctx("x"), "<p>x</p>");

        preview.scroll_y(42.0);
        assert!(scripts(&rec).is_empty());
        assert_eq!(preview.deferred_len(), 1);

        preview.editor_selection_changed(TextSelection::new(3, 5));
        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);

        assert_eq!(
            scripts(&rec),
            vec!["preview.scrollTo(42);", "preview.highlightNodesAt(5)"]
        );
        assert_eq!(preview.deferred_len(), 0);

        // Drained exactly once
        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);
        assert_eq!(scripts(&rec).len(), 2);
    }

    #[test]
    fn test_scroll_when_loaded_runs_immediately() {
        let (mut preview, rec) = preview();
        preview.scroll_y(7.0);
        assert_eq!(scripts(&rec), vec!["preview.scrollTo(7);"]);
    }

    #[test]
    fn test_identical_selection_highlights_once() {
        let (mut preview, rec) = preview();
        let sel = TextSelection::new(10, 12);

        preview.editor_selection_changed(sel);
        preview.editor_selection_changed(sel);
        assert_eq!(scripts(&rec), vec!["preview.highlightNodesAt(12)"]);

        preview.editor_selection_changed(TextSelection::caret(4));
        assert_eq!(scripts(&rec).len(), 2);
    }

    #[test]
    fn test_selection_from_update_counts_as_applied() {
        let (mut preview, rec) = preview();
        let context = RenderContext::new(
            None,
            "abc".to_string(),
            Arc::new(Node::parse("abc")),
            TextSelection::caret(2),
            (0.0, 0.0),
        );
        preview.update(&context, "<p>abc</p>");
        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);

        preview.editor_selection_changed(TextSelection::caret(2));
        assert!(scripts(&rec).is_empty());
        assert!(preview.node().as_str().unwrap().contains("preview.highlightNodesAt(2)"));
    }

    #[test]
    fn test_scroll_read_skipped_while_loading() {
        let (mut preview, rec) = preview();
        rec.borrow_mut().scroll = (0.0, 300.0);

        preview.update(&ctx("a"), "<p>a</p>");
        assert!(rec.borrow().loads[0]
            .1
            .contains("<body onload='window.scrollTo(0, 300);'>"));

        // Mid-load reads would be zero; the last real position is kept
        rec.borrow_mut().scroll = (0.0, 0.0);
        preview.update(&ctx("b"), "<p>b</p>");
        assert!(rec.borrow().loads[1].1.contains("window.scrollTo(0, 300)"));

        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);
        preview.update(&ctx("c"), "<p>c</p>");
        assert!(!rec.borrow().loads[2].1.contains("onload="));
    }

    #[test]
    fn test_stale_completion_ignored() {
        let (mut preview, _rec) = preview();
        preview.update(&ctx("a"), "<p>a</p>");
        let first = preview.current_ticket();
        preview.update(&ctx("b"), "<p>b</p>");

        preview.load_finished(first, LoadOutcome::Succeeded);
        assert_eq!(preview.load_state(), LoadState::Loading);
        assert_eq!(preview.node(), PreviewNode::Empty);

        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);
        assert!(preview.node().as_str().unwrap().contains("<p>b</p>"));
    }

    #[test]
    fn test_failed_load_keeps_content_and_recovers() {
        let (mut preview, rec) = preview();
        preview.update(&ctx("a"), "<p>a</p>");
        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);

        preview.update(&ctx("b"), "<p>b</p>");
        preview.scroll_y(5.0);
        preview.load_finished(preview.current_ticket(), LoadOutcome::Failed);

        assert_eq!(preview.load_state(), LoadState::Failed);
        assert!(preview.node().as_str().unwrap().contains("<p>a</p>"));
        assert_eq!(preview.deferred_len(), 0);
        assert!(scripts(&rec).is_empty());

        // Interactive again, and the next update starts a new cycle
        preview.scroll_y(6.0);
        assert_eq!(scripts(&rec), vec!["preview.scrollTo(6);"]);
        preview.update(&ctx("c"), "<p>c</p>");
        assert_eq!(preview.load_state(), LoadState::Loading);
        preview.load_finished(preview.current_ticket(), LoadOutcome::Succeeded);
        assert!(preview.node().as_str().unwrap().contains("<p>c</p>"));
    }

    #[test]
    fn test_base_href_from_path() {
        let (mut preview, rec) = preview();
        let context = RenderContext::from_markdown(Some(PathBuf::from("/books/novel/ch1.md")), "x");
        preview.update(&context, "<p>x</p>");
        assert!(rec.borrow().loads[0].1.contains("<base href=\"file:///books/novel/\">"));
    }

    #[test]
    fn test_no_code_no_highlighter() {
        let (mut preview, rec) = preview();
        preview.update(&ctx("plain text"), "<p>plain text</p>");
        let html = rec.borrow().loads[0].1.clone();
        assert!(!html.contains("prism.css"));
        assert!(!html.contains("prism-core"));
    }
}
