//! Editor session: one open document bound to its preview
//!
//! Every change reaches the session as a [`SessionEvent`], either through
//! [`EditorSession::handle`] or through the channel drained by
//! [`EditorSession::process_events`]. Changes that affect the rendered output
//! request an update from the session's [`UpdateScheduler`]; the render itself
//! runs on a later tick of the engine's task queue, resolves the preview type
//! and hands a fresh [`RenderContext`] to the matching surface.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use quire_core::markdown::render_html;
use quire_core::preview_type;
use quire_core::{Document, Node, PreviewType, RenderContext, TextSelection, ViewFlags};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
#[cfg(feature = "watch")]
use std::time::Duration;

use crate::engine::PreviewEngine;
use crate::scheduler::UpdateScheduler;
use crate::surface::{LoadState, PreviewSurface};
#[cfg(feature = "watch")]
use crate::watcher::DocumentWatcher;
use crate::SessionEvent;

struct SessionState {
    engine: Rc<PreviewEngine>,
    document: Document,
    flags: ViewFlags,
    preview_type: PreviewType,
    selection: TextSelection,
    scroll_y: f64,
    active: bool,
    /// Surfaces created so far, kept when the type changes away
    surfaces: HashMap<PreviewType, Box<dyn PreviewSurface>>,
    events: Sender<SessionEvent>,
    renders: usize,
}

pub struct EditorSession {
    state: Rc<RefCell<SessionState>>,
    scheduler: UpdateScheduler,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    #[cfg(feature = "watch")]
    watcher: Option<DocumentWatcher>,
}

impl EditorSession {
    /// Bind `document` to a new, inactive session. Nothing renders until the
    /// session receives [`SessionEvent::Activated`].
    pub fn new(engine: Rc<PreviewEngine>, document: Document) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let scheduler = UpdateScheduler::new(engine.queue());
        let flags = engine.config().preview.view_flags();

        #[cfg(feature = "watch")]
        let watcher = start_watcher(&engine, &document);

        let state = SessionState {
            engine,
            document,
            flags,
            preview_type: PreviewType::None,
            selection: TextSelection::default(),
            scroll_y: 0.0,
            active: false,
            surfaces: HashMap::new(),
            events: events_tx.clone(),
            renders: 0,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            scheduler,
            events_tx,
            events_rx,
            #[cfg(feature = "watch")]
            watcher,
        }
    }

    /// Sender for events produced off the session, e.g. by a host's browser view
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Queue an event for the next [`EditorSession::process_events`]
    pub fn send(&self, event: SessionEvent) {
        // The receiver lives as long as `self`
        let _ = self.events_tx.send(event);
    }

    /// Handle all queued events. Returns the number handled.
    pub fn process_events(&mut self) -> Result<usize> {
        #[cfg(feature = "watch")]
        self.poll_watcher();

        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Apply one event
    pub fn handle(&mut self, event: SessionEvent) -> Result<()> {
        #[cfg(feature = "watch")]
        let path_changed = matches!(event, SessionEvent::PathChanged(_));

        let needs_update = {
            let mut state = self.state.borrow_mut();
            match event {
                SessionEvent::TextChanged(text) => {
                    if !state.document.set_text(&text) {
                        debug!("Ignoring edit of read-only {}", state.document.title());
                        false
                    } else {
                        state.active
                    }
                }
                SessionEvent::SelectionChanged(selection) => {
                    state.selection = selection;
                    if let Some(surface) = state.current_surface() {
                        surface.editor_selection_changed(selection);
                    }
                    false
                }
                SessionEvent::ScrollChanged(value) => {
                    state.scroll_y = value;
                    if let Some(surface) = state.current_surface() {
                        surface.scroll_y(value);
                    }
                    false
                }
                SessionEvent::FlagsChanged(flags) => {
                    state.flags = flags;
                    state.active
                }
                SessionEvent::PathChanged(path) => {
                    state.document.path = path;
                    state.active
                }
                SessionEvent::Activated => {
                    state.active = true;
                    if let Err(e) = state.reload_if_changed() {
                        warn!("Failed to reload {}: {:#}", state.document.title(), e);
                    }
                    true
                }
                SessionEvent::Deactivated => {
                    state.active = false;
                    false
                }
                SessionEvent::LoadFinished(ticket, outcome) => {
                    match state.surfaces.get_mut(&PreviewType::Web).and_then(|s| s.as_web_mut()) {
                        Some(web) => web.load_finished(ticket, outcome),
                        None => debug!("Load completion {:?} without a web preview", ticket),
                    }
                    false
                }
                SessionEvent::FileChanged => state.file_changed()? && state.active,
            }
        };

        #[cfg(feature = "watch")]
        if path_changed {
            let state = self.state.borrow();
            self.watcher = start_watcher(&state.engine, &state.document);
        }

        if needs_update {
            self.request_update();
        }
        Ok(())
    }

    /// Schedule a render on the next tick. Returns `false` if one is already pending.
    pub fn request_update(&self) -> bool {
        let state: Weak<RefCell<SessionState>> = Rc::downgrade(&self.state);
        self.scheduler.request_update(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().render();
            }
        })
    }

    pub fn update_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn preview_type(&self) -> PreviewType {
        self.state.borrow().preview_type
    }

    /// Whether a preview sits next to the editor
    pub fn preview_attached(&self) -> bool {
        self.preview_type() != PreviewType::None
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    pub fn read_only(&self) -> bool {
        self.state.borrow().document.read_only
    }

    pub fn view_flags(&self) -> ViewFlags {
        self.state.borrow().flags
    }

    /// Number of renders executed so far
    pub fn render_count(&self) -> usize {
        self.state.borrow().renders
    }

    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.state.borrow().document)
    }

    /// Current content of the attached preview, `None` if nothing is shown
    pub fn preview_text(&self) -> Option<String> {
        let state = self.state.borrow();
        state
            .surfaces
            .get(&state.preview_type)
            .and_then(|surface| surface.node().as_str().map(str::to_string))
    }

    /// Load state of the web preview, if one was ever created
    pub fn load_state(&self) -> Option<LoadState> {
        let mut state = self.state.borrow_mut();
        state
            .surfaces
            .get_mut(&PreviewType::Web)
            .and_then(|s| s.as_web_mut())
            .map(|web| web.load_state())
    }

    /// Write the document to disk
    pub fn save(&mut self) -> Result<()> {
        self.state.borrow_mut().document.save()
    }

    /// Cancel any pending render and drop the surfaces
    pub fn close(&mut self) {
        self.scheduler.dispose();
        self.state.borrow_mut().surfaces.clear();
        #[cfg(feature = "watch")]
        {
            self.watcher = None;
        }
    }

    #[cfg(feature = "watch")]
    fn poll_watcher(&mut self) {
        if let Some(event) = self.watcher.as_mut().and_then(DocumentWatcher::poll) {
            self.send(event);
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.scheduler.dispose();
    }
}

impl SessionState {
    fn current_surface(&mut self) -> Option<&mut Box<dyn PreviewSurface>> {
        self.surfaces.get_mut(&self.preview_type)
    }

    fn render(&mut self) {
        let external = self.engine.external_available();
        let resolved = preview_type::resolve(self.document.is_markdown(), self.flags, external);
        if resolved != self.preview_type {
            debug!(
                "{}: preview {} -> {}",
                self.document.title(),
                self.preview_type,
                resolved
            );
            self.preview_type = resolved;
        }
        if resolved == PreviewType::None {
            return;
        }

        let markdown = self.document.text();
        let ast = Arc::new(Node::parse(&markdown));
        let html = match resolved {
            PreviewType::Ast => String::new(),
            _ => render_html(&markdown),
        };
        let context = RenderContext::new(
            self.document.path.clone(),
            markdown,
            ast,
            self.selection,
            (0.0, self.scroll_y),
        );

        if !self.surfaces.contains_key(&resolved) {
            match self.engine.create_surface(resolved, self.events.clone()) {
                Some(surface) => {
                    self.surfaces.insert(resolved, surface);
                }
                None => {
                    warn!("No {} preview available", resolved);
                    self.preview_type = PreviewType::None;
                    return;
                }
            }
        }

        if let Some(surface) = self.surfaces.get_mut(&resolved) {
            surface.update(&context, &html);
            self.renders += 1;
        }
    }

    /// Pick up changes made on disk while the editor was in the background
    fn reload_if_changed(&mut self) -> Result<()> {
        if !self.document.changed_on_disk() {
            return Ok(());
        }
        if self.document.modified {
            debug!("{} changed on disk, keeping unsaved edits", self.document.title());
            self.document.dirty_on_disk = true;
            return Ok(());
        }
        self.reload()
    }

    /// Returns whether the document was reloaded
    fn file_changed(&mut self) -> Result<bool> {
        if !self.document.changed_on_disk() {
            return Ok(false);
        }
        if !self.auto_reload() || self.document.modified {
            self.document.dirty_on_disk = true;
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    fn reload(&mut self) -> Result<()> {
        let exists = self.document.path.as_deref().is_some_and(|p| p.exists());
        if !exists {
            warn!("{} was removed from disk", self.document.title());
            self.document.dirty_on_disk = true;
            return Ok(());
        }
        debug!("Reloading {}", self.document.title());
        let config = self.engine.config().document.clone();
        self.document.reload(&config)
    }

    #[cfg(feature = "watch")]
    fn auto_reload(&self) -> bool {
        self.engine.config().watch.auto_reload
    }

    #[cfg(not(feature = "watch"))]
    fn auto_reload(&self) -> bool {
        false
    }
}

#[cfg(feature = "watch")]
fn start_watcher(engine: &PreviewEngine, document: &Document) -> Option<DocumentWatcher> {
    if !engine.config().watch.enabled {
        return None;
    }
    let path = document.path.as_deref()?;
    let debounce = Duration::from_millis(engine.config().watch.debounce_ms);
    match DocumentWatcher::new(path, debounce) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Not watching {}: {:#}", path.display(), e);
            None
        }
    }
}
