//! Choosing which preview a document gets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The preview variant attached next to the editor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviewType {
    /// No preview is attached to the layout
    #[default]
    None,
    /// Rendered HTML
    Web,
    /// Generated HTML shown as text
    Source,
    /// Dump of the parsed document tree
    Ast,
    /// Rendering delegated to a host-provided renderer
    External,
}

impl fmt::Display for PreviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreviewType::None => "none",
            PreviewType::Web => "web",
            PreviewType::Source => "source",
            PreviewType::Ast => "ast",
            PreviewType::External => "external",
        };
        f.write_str(name)
    }
}

/// View toggles as set by the user. Conventionally at most one is on, but
/// nothing here relies on that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFlags {
    pub web: bool,
    pub source: bool,
    pub ast: bool,
    pub external: bool,
}

impl ViewFlags {
    /// Flags with only the toggle for `preview_type` set
    pub fn only(preview_type: PreviewType) -> Self {
        Self {
            web: preview_type == PreviewType::Web,
            source: preview_type == PreviewType::Source,
            ast: preview_type == PreviewType::Ast,
            external: preview_type == PreviewType::External,
        }
    }
}

/// Pick the active preview type. The first matching rule wins.
pub fn resolve(is_markdown: bool, flags: ViewFlags, external_available: bool) -> PreviewType {
    if !is_markdown {
        PreviewType::None
    } else if flags.web {
        PreviewType::Web
    } else if flags.source {
        PreviewType::Source
    } else if flags.ast {
        PreviewType::Ast
    } else if flags.external && external_available {
        PreviewType::External
    } else {
        PreviewType::None
    }
}

/// Whether `path` names a markdown file (`.md`, any case)
pub fn is_markdown_path(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".md")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: ViewFlags = ViewFlags {
        web: true,
        source: true,
        ast: true,
        external: true,
    };

    #[test]
    fn test_non_markdown_is_always_none() {
        assert_eq!(resolve(false, ALL, true), PreviewType::None);
        assert_eq!(resolve(false, ViewFlags::only(PreviewType::Web), true), PreviewType::None);
        assert_eq!(resolve(false, ViewFlags::default(), false), PreviewType::None);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(resolve(true, ALL, true), PreviewType::Web);

        let flags = ViewFlags { web: false, ..ALL };
        assert_eq!(resolve(true, flags, true), PreviewType::Source);

        let flags = ViewFlags { web: false, source: false, ..ALL };
        assert_eq!(resolve(true, flags, true), PreviewType::Ast);

        let flags = ViewFlags::only(PreviewType::External);
        assert_eq!(resolve(true, flags, true), PreviewType::External);
    }

    #[test]
    fn test_external_requires_capability() {
        let flags = ViewFlags::only(PreviewType::External);
        assert_eq!(resolve(true, flags, false), PreviewType::None);
    }

    #[test]
    fn test_no_flags_is_none() {
        assert_eq!(resolve(true, ViewFlags::default(), true), PreviewType::None);
    }

    #[test]
    fn test_is_markdown_path() {
        assert!(is_markdown_path(Path::new("/docs/chapter1.md")));
        assert!(is_markdown_path(Path::new("README.MD")));
        assert!(!is_markdown_path(Path::new("notes.markdown.txt")));
        assert!(!is_markdown_path(Path::new("image.png")));
    }
}
