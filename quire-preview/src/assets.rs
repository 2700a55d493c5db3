//! Locating preview stylesheets and scripts
//!
//! The web preview references its assets by URL. The layout below an asset
//! directory is:
//!
//! ```text
//! preview.css
//! preview.js
//! prism/prism.css
//! prism/prism-core.min.js
//! prism/components/prism-<language>.min.js
//! prism/lang_dependencies.txt
//! ```

use log::debug;
use quire_core::DependencyMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the web preview finds its assets
pub trait AssetLocator {
    /// Main preview stylesheet
    fn stylesheet(&self) -> String;
    /// Preview runtime providing `preview.scrollTo` and `preview.highlightNodesAt`
    fn runtime_script(&self) -> String;
    /// Syntax-highlighting stylesheet
    fn highlight_stylesheet(&self) -> String;
    /// Syntax-highlighting core script
    fn highlight_core(&self) -> String;
    /// Script for one language, `None` if there is no such asset
    fn language_script(&self, language: &str) -> Option<String>;
    /// Language dependency table, empty if unavailable
    fn dependency_table(&self) -> DependencyMap;
}

/// Assets laid out in a directory on disk
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default asset directory in the platform data dir
    pub fn default_root() -> Option<PathBuf> {
        quire_core::Config::data_dir().map(|dir| dir.join("assets"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url(&self, relative: &str) -> String {
        file_url(&self.root.join(relative))
    }
}

impl AssetLocator for DirAssets {
    fn stylesheet(&self) -> String {
        self.url("preview.css")
    }

    fn runtime_script(&self) -> String {
        self.url("preview.js")
    }

    fn highlight_stylesheet(&self) -> String {
        self.url("prism/prism.css")
    }

    fn highlight_core(&self) -> String {
        self.url("prism/prism-core.min.js")
    }

    fn language_script(&self, language: &str) -> Option<String> {
        if !is_safe_language(language) {
            debug!("Refusing highlighter lookup for language {:?}", language);
            return None;
        }

        let relative = format!("prism/components/prism-{language}.min.js");
        if self.root.join(&relative).is_file() {
            Some(self.url(&relative))
        } else {
            debug!("No highlighter for language {}", language);
            None
        }
    }

    fn dependency_table(&self) -> DependencyMap {
        DependencyMap::load(&self.root.join("prism/lang_dependencies.txt"))
    }
}

/// `file://` URL for an absolute path, the plain path otherwise
pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| path.to_string_lossy().into_owned())
}

/// `file://` URL of a directory, with the trailing slash relative links need
pub fn directory_url(path: &Path) -> Option<String> {
    Url::from_directory_path(path).ok().map(String::from)
}

/// Language tags come straight from the document; keep them out of the file system
fn is_safe_language(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}
