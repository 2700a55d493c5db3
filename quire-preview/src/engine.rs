//! Preview engine: state shared by every editor session

use anyhow::Result;
use crossbeam_channel::Sender;
use log::debug;
use once_cell::unsync::OnceCell;
use quire_core::{Config, DependencyMap, Document, PreviewType};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::assets::{AssetLocator, DirAssets};
use crate::scheduler::TaskQueue;
use crate::session::EditorSession;
use crate::surface::{
    AstPreview, ExternalPreview, PreviewHost, PreviewSurface, SourcePreview, WebPreview,
};
use crate::SessionEvent;

/// Owns configuration, assets and the highlighter dependency table, and opens
/// editor sessions. Several engines can coexist; nothing here is global.
pub struct PreviewEngine {
    config: Config,
    assets: Rc<dyn AssetLocator>,
    dependencies: OnceCell<Rc<DependencyMap>>,
    queue: Rc<dyn TaskQueue>,
    host: Rc<dyn PreviewHost>,
}

impl PreviewEngine {
    /// Engine with assets from the configured directory, or the platform data dir
    pub fn new(config: Config, queue: Rc<dyn TaskQueue>, host: Rc<dyn PreviewHost>) -> Self {
        let root = config
            .assets
            .dir
            .clone()
            .or_else(DirAssets::default_root)
            .unwrap_or_else(|| PathBuf::from("assets"));
        debug!("Preview assets in {}", root.display());

        Self::with_assets(config, Rc::new(DirAssets::new(root)), queue, host)
    }

    pub fn with_assets(
        config: Config,
        assets: Rc<dyn AssetLocator>,
        queue: Rc<dyn TaskQueue>,
        host: Rc<dyn PreviewHost>,
    ) -> Self {
        Self {
            config,
            assets,
            dependencies: OnceCell::new(),
            queue,
            host,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn queue(&self) -> Rc<dyn TaskQueue> {
        self.queue.clone()
    }

    /// Dependency table, read from the assets on first use
    pub fn dependencies(&self) -> Rc<DependencyMap> {
        self.dependencies
            .get_or_init(|| {
                let table = self.assets.dependency_table();
                debug!("Loaded {} highlighter dependencies", table.len());
                Rc::new(table)
            })
            .clone()
    }

    pub fn external_available(&self) -> bool {
        self.host.has_external_renderer()
    }

    /// Open `path` in a new, inactive session
    pub fn open(self: &Rc<Self>, path: &Path) -> Result<EditorSession> {
        let document = Document::load(path, &self.config.document)?;
        Ok(EditorSession::new(Rc::clone(self), document))
    }

    /// New session for an empty, unsaved document
    pub fn untitled(self: &Rc<Self>) -> EditorSession {
        EditorSession::new(Rc::clone(self), Document::untitled())
    }

    /// Build the surface for `preview_type`. `None` for [`PreviewType::None`]
    /// and for an external preview the host cannot provide.
    pub(crate) fn create_surface(
        &self,
        preview_type: PreviewType,
        events: Sender<SessionEvent>,
    ) -> Option<Box<dyn PreviewSurface>> {
        debug!("Creating {} preview", preview_type);
        match preview_type {
            PreviewType::None => None,
            PreviewType::Web => Some(Box::new(WebPreview::new(
                self.host.create_render_target(events),
                self.assets.clone(),
                self.dependencies(),
                self.config.preview.additional_css.clone(),
            ))),
            PreviewType::Source => Some(Box::new(SourcePreview::new())),
            PreviewType::Ast => Some(Box::new(AstPreview::new())),
            PreviewType::External => self
                .host
                .external_renderer()
                .map(|renderer| Box::new(ExternalPreview::new(renderer)) as Box<dyn PreviewSurface>),
        }
    }
}
