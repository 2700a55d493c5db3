//! Quire Preview - Keeping a preview in step with the editor
//!
//! This crate binds an editor session to its preview:
//! - Event channel carrying editor, host and file system changes
//! - Render coalescing on an injected single-threaded task queue
//! - Preview surfaces (web, HTML source, AST dump, external)
//! - Assembly of the web preview document and its highlighting scripts
//! - Load-state tracking with deferred scroll and selection actions

pub mod assets;
pub mod engine;
pub mod event;
pub mod html;
pub mod scheduler;
pub mod session;
pub mod surface;

#[cfg(feature = "watch")]
pub mod watcher;

// Re-export main types
pub use assets::{AssetLocator, DirAssets};
pub use engine::PreviewEngine;
pub use event::SessionEvent;
pub use scheduler::{LocalTaskQueue, TaskQueue, UpdateScheduler};
pub use session::EditorSession;
pub use surface::{
    HeadlessHost, LoadOutcome, LoadState, LoadTicket, PreviewHost, PreviewNode, PreviewSurface,
    RenderTarget,
};
