//! Assembling the HTML document loaded into the web preview

use quire_core::DependencyMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::assets::{directory_url, AssetLocator};

/// Style applied by the runtime to the block under the editor caret
pub const SELECTION_STYLE: &str = "\
.quire-editor-selection {
  border-right: 5px solid #f47806;
  margin-right: -5px;
  background-color: rgb(253, 247, 241);
}";

/// Everything that varies between two assembled preview documents
#[derive(Debug, Clone, Default)]
pub struct DocumentParts<'a> {
    pub stylesheet: String,
    pub additional_css: &'a str,
    pub runtime_script: String,
    /// Highlighting tags, empty when the document has no code languages
    pub highlighting: String,
    /// `<base>` target, the directory of the document
    pub base_href: Option<String>,
    /// Scroll offset restored once the body has loaded
    pub scroll: (i64, i64),
    pub body: &'a str,
    /// Source offset whose block gets the selection highlight
    pub highlight_offset: usize,
}

impl DocumentParts<'_> {
    /// Render the full HTML5 document
    pub fn assemble(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 1024);

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", self.stylesheet);
        out.push_str("<style>\n");
        out.push_str(self.additional_css);
        out.push('\n');
        out.push_str(SELECTION_STYLE);
        out.push_str("\n</style>\n");
        let _ = writeln!(out, "<script src=\"{}\"></script>", self.runtime_script);
        out.push_str(&self.highlighting);
        if let Some(base) = &self.base_href {
            let _ = writeln!(out, "<base href=\"{base}\">");
        }
        out.push_str("</head>\n");

        let (x, y) = self.scroll;
        if x > 0 || y > 0 {
            let _ = writeln!(out, "<body onload='window.scrollTo({x}, {y});'>");
        } else {
            out.push_str("<body>\n");
        }
        out.push_str(self.body);
        let _ = writeln!(out, "<script>{}</script>", highlight_script(self.highlight_offset));
        out.push_str("</body>\n</html>");

        out
    }
}

/// Stylesheet, core script and per-language scripts for the given code
/// languages, or an empty string when there are none.
///
/// Languages are ordered by `dependencies`; languages without a script asset
/// are left out.
pub fn highlighting_tags<S: AsRef<str>>(
    assets: &dyn AssetLocator,
    dependencies: &DependencyMap,
    languages: &[S],
) -> String {
    if languages.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", assets.highlight_stylesheet());
    let _ = writeln!(out, "<script src=\"{}\"></script>", assets.highlight_core());
    for language in dependencies.resolve(languages) {
        if let Some(url) = assets.language_script(&language) {
            let _ = writeln!(out, "<script src=\"{url}\"></script>");
        }
    }
    out
}

/// `<base>` target for a document path: its parent directory
pub fn base_href(path: &Path) -> Option<String> {
    path.parent().and_then(directory_url)
}

pub fn highlight_script(offset: usize) -> String {
    format!("preview.highlightNodesAt({offset})")
}

pub fn scroll_script(value: f64) -> String {
    format!("preview.scrollTo({value});")
}
