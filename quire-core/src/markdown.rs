//! Markdown rendering through pulldown-cmark

use pulldown_cmark::{html, Options, Parser};

/// Parser extensions enabled for both the AST and the HTML output
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render markdown source to an HTML fragment (the document body)
pub fn render_html(source: &str) -> String {
    let parser = Parser::new_ext(source, parser_options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
