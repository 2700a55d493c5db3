//! Configuration management for quire

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::preview_type::ViewFlags;

/// Files larger than this open as a read-only placeholder
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500_000;

/// Binary files up to this size get a hex dump below the placeholder
pub const DEFAULT_MAX_HEX_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preview: PreviewConfig,
    pub document: DocumentConfig,
    pub assets: AssetConfig,
    #[cfg(feature = "watch")]
    pub watch: WatchConfig,
}

/// Which preview is requested, plus user CSS for the web preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub web: bool,
    pub source: bool,
    pub ast: bool,
    pub external: bool,
    pub additional_css: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub max_file_size: u64,
    pub max_hex_file_size: u64,
    /// Decode invalid UTF-8 lossily instead of failing the load
    pub lossy_decoding: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the preview stylesheet, runtime script and prism files
    pub dir: Option<PathBuf>,
}

#[cfg(feature = "watch")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub enabled: bool,
    pub auto_reload: bool,
    /// Quiet period before a burst of file events counts as one change
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            web: true,
            source: false,
            ast: false,
            external: false,
            additional_css: String::new(),
        }
    }
}

impl PreviewConfig {
    pub fn view_flags(&self) -> ViewFlags {
        ViewFlags {
            web: self.web,
            source: self.source,
            ast: self.ast,
            external: self.external,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_hex_file_size: DEFAULT_MAX_HEX_FILE_SIZE,
            lossy_decoding: true,
        }
    }
}

#[cfg(feature = "watch")]
impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_reload: true,
            debounce_ms: 250,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "quire")
            .map(|proj_dirs| proj_dirs.config_dir().join("quire.toml"))
    }

    /// Get the platform-specific data directory (asset files live below it)
    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "quire")
            .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
    }

    /// Load configuration from the platform config file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}
