//! Render targets without a browser
//!
//! Used by the command line front end and by tests. A headless target
//! records every load and script and reports load completion through the
//! session's event channel, so completions arrive on a later event pump just
//! as they would from a real browser view.

use crossbeam_channel::Sender;
use log::trace;
use quire_core::RenderContext;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::web::{LoadOutcome, LoadTicket, RenderTarget};
use super::{ExternalRenderer, PreviewHost, PreviewNode};
use crate::SessionEvent;

/// Everything a headless target was asked to do
#[derive(Debug, Default)]
pub struct TargetLog {
    pub loads: Vec<(LoadTicket, String)>,
    /// Scripts in execution order, scroll position reads excluded
    pub scripts: Vec<String>,
    /// Page scroll position reported to `window.scrollX`/`window.scrollY`
    pub scroll: (f64, f64),
}

impl TargetLog {
    pub fn last_load(&self) -> Option<&str> {
        self.loads.last().map(|(_, html)| html.as_str())
    }
}

pub struct HeadlessTarget {
    log: Rc<RefCell<TargetLog>>,
    events: Sender<SessionEvent>,
    completion: Rc<Cell<Option<LoadOutcome>>>,
}

impl HeadlessTarget {
    /// A target reporting `completion` for every load, or nothing if `None`
    pub fn new(
        events: Sender<SessionEvent>,
        completion: Rc<Cell<Option<LoadOutcome>>>,
    ) -> Self {
        Self {
            log: Rc::new(RefCell::new(TargetLog::default())),
            events,
            completion,
        }
    }

    pub fn log(&self) -> Rc<RefCell<TargetLog>> {
        self.log.clone()
    }
}

impl RenderTarget for HeadlessTarget {
    fn load_content(&mut self, html: &str, ticket: LoadTicket) {
        trace!("Headless load {:?} ({} bytes)", ticket, html.len());
        self.log.borrow_mut().loads.push((ticket, html.to_string()));

        if let Some(outcome) = self.completion.get() {
            // Receiver gone means the session closed; nothing left to notify
            let _ = self.events.send(SessionEvent::LoadFinished(ticket, outcome));
        }
    }

    fn execute_script(&mut self, script: &str) -> Option<f64> {
        let mut log = self.log.borrow_mut();
        match script {
            "window.scrollX" => Some(log.scroll.0),
            "window.scrollY" => Some(log.scroll.1),
            _ => {
                log.scripts.push(script.to_string());
                None
            }
        }
    }
}

/// Keeps the last rendered fragment, standing in for an external viewer
#[derive(Debug, Default)]
pub struct CapturingRenderer {
    html: String,
}

impl ExternalRenderer for CapturingRenderer {
    fn update(&mut self, _context: &RenderContext, html: &str) {
        self.html = html.to_string();
    }

    fn node(&self) -> PreviewNode<'_> {
        PreviewNode::Html(&self.html)
    }
}

/// Host creating [`HeadlessTarget`]s
pub struct HeadlessHost {
    completion: Rc<Cell<Option<LoadOutcome>>>,
    external: bool,
    targets: RefCell<Vec<Rc<RefCell<TargetLog>>>>,
}

impl HeadlessHost {
    /// Loads complete successfully on the next event pump
    pub fn new() -> Self {
        Self {
            completion: Rc::new(Cell::new(Some(LoadOutcome::Succeeded))),
            external: false,
            targets: RefCell::new(Vec::new()),
        }
    }

    /// Loads never complete on their own
    pub fn manual() -> Self {
        let host = Self::new();
        host.completion.set(None);
        host
    }

    /// Also offer an external renderer
    pub fn with_external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Change how subsequent loads of every target complete
    pub fn set_completion(&self, completion: Option<LoadOutcome>) {
        self.completion.set(completion);
    }

    /// Log of the `index`th target created
    pub fn target_log(&self, index: usize) -> Option<Rc<RefCell<TargetLog>>> {
        self.targets.borrow().get(index).cloned()
    }

    pub fn target_count(&self) -> usize {
        self.targets.borrow().len()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewHost for HeadlessHost {
    fn create_render_target(&self, events: Sender<SessionEvent>) -> Box<dyn RenderTarget> {
        let target = HeadlessTarget::new(events, self.completion.clone());
        self.targets.borrow_mut().push(target.log());
        Box::new(target)
    }

    fn external_renderer(&self) -> Option<Box<dyn ExternalRenderer>> {
        self.external
            .then(|| Box::new(CapturingRenderer::default()) as Box<dyn ExternalRenderer>)
    }

    fn has_external_renderer(&self) -> bool {
        self.external
    }
}
