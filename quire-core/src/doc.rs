//! Document model with Rope-based text storage

use anyhow::{Context, Result};
use log::debug;
use ropey::Rope;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::DocumentConfig;
use crate::hex::hex_dump;
use crate::preview_type::is_markdown_path;

/// What was found on disk when the document was loaded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// Editable text
    Text,
    /// Over the size ceiling; the rope holds a placeholder message
    TooLarge { size: u64 },
    /// Contains a NUL byte; the rope holds a placeholder (and maybe a hex dump)
    Binary { size: u64 },
}

/// The main document structure
#[derive(Clone, Debug)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub rope: Rope,
    pub kind: DocumentKind,
    pub read_only: bool,
    /// Unsaved edits since the last load or save
    pub modified: bool,
    pub loaded_mtime: Option<SystemTime>,
    pub dirty_on_disk: bool,
    pub rev: u64,
}

impl Document {
    /// An empty, unsaved document
    pub fn untitled() -> Self {
        Self {
            path: None,
            rope: Rope::new(),
            kind: DocumentKind::Text,
            read_only: false,
            modified: false,
            loaded_mtime: None,
            dirty_on_disk: false,
            rev: 1,
        }
    }

    /// Load a document from a file path
    pub fn load(path: &Path, config: &DocumentConfig) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let mut doc = Self::untitled();
        doc.path = Some(abs_path);
        doc.rev = 0;
        doc.reload(config)?;
        Ok(doc)
    }

    /// Reload the document from disk, discarding unsaved edits
    pub fn reload(&mut self, config: &DocumentConfig) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;
        let size = metadata.len();

        let (text, kind) = if size > config.max_file_size {
            debug!("{} exceeds {} bytes, opening read-only", path.display(), config.max_file_size);
            (too_large_message(size, config.max_file_size), DocumentKind::TooLarge { size })
        } else {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            if bytes.contains(&0) {
                let mut text = binary_message(size);
                if size <= config.max_hex_file_size {
                    text.push_str("\n\n\n");
                    text.push_str(&hex_dump(&bytes));
                }
                (text, DocumentKind::Binary { size })
            } else {
                (decode(bytes, config.lossy_decoding, &path)?, DocumentKind::Text)
            }
        };

        self.rope = Rope::from_str(&text);
        self.kind = kind;
        self.read_only = kind != DocumentKind::Text;
        self.modified = false;
        self.loaded_mtime = metadata.modified().ok();
        self.dirty_on_disk = false;
        self.rev += 1;

        Ok(())
    }

    /// Write the text back to disk
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            anyhow::bail!("Document has no path");
        };
        if self.read_only {
            anyhow::bail!("Document is read-only: {}", path.display());
        }

        fs::write(path, self.text())
            .with_context(|| format!("Failed to save file: {}", path.display()))?;

        self.loaded_mtime = fs::metadata(path).and_then(|m| m.modified()).ok();
        self.modified = false;
        self.dirty_on_disk = false;
        Ok(())
    }

    /// Whether the file on disk is newer than what was loaded
    pub fn changed_on_disk(&self) -> bool {
        let Some(path) = self.path.as_ref() else {
            return false;
        };
        let disk_mtime = fs::metadata(path).and_then(|m| m.modified()).ok();
        disk_mtime != self.loaded_mtime
    }

    /// Replace the whole text (an editor mutation). Ignored when read-only.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.read_only {
            return false;
        }
        self.rope = Rope::from_str(text);
        self.modified = true;
        self.rev += 1;
        true
    }

    /// Full text of the document
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Markdown documents get a preview; placeholders for large or binary files never do
    pub fn is_markdown(&self) -> bool {
        self.kind == DocumentKind::Text
            && self.path.as_deref().is_some_and(is_markdown_path)
    }

    /// Display name for tabs and titles
    pub fn title(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

fn decode(bytes: Vec<u8>, lossy: bool, path: &Path) -> Result<String> {
    if lossy {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {}", path.display()))
}

fn too_large_message(size: u64, max: u64) -> String {
    format!("File too large to edit ({size} bytes, maximum is {max} bytes).")
}

fn binary_message(size: u64) -> String {
    format!("Binary file ({size} bytes), not editable.")
}
