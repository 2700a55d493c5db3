//! Parsed document tree
//!
//! The tree is deliberately small: fenced code blocks are the only node kind
//! the preview pipeline inspects, everything else is an `Other` node carrying
//! a display label and its children.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};
use std::fmt::Write as _;

use crate::markdown::parser_options;

/// A node of the parsed markdown document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A fenced code block; `language` is empty when the fence has no info string
    FencedCodeBlock { language: String, literal: String },
    /// Any other node
    Other { label: String, children: Vec<Node> },
}

impl Node {
    /// Create a non-code node
    pub fn other(label: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Other {
            label: label.into(),
            children,
        }
    }

    /// Create a fenced code block node without content
    pub fn code_block(language: impl Into<String>) -> Self {
        Node::FencedCodeBlock {
            language: language.into(),
            literal: String::new(),
        }
    }

    /// An empty document
    pub fn empty_document() -> Self {
        Node::other("Document", Vec::new())
    }

    /// Parse markdown source into a tree rooted at a `Document` node
    pub fn parse(source: &str) -> Self {
        let parser = Parser::new_ext(source, parser_options());
        let mut stack: Vec<Frame> = vec![Frame::Element {
            label: "Document".to_string(),
            children: Vec::new(),
        }];

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => Some(fence_language(&info)),
                        CodeBlockKind::Indented => None,
                    };
                    stack.push(Frame::Code {
                        language,
                        literal: String::new(),
                    });
                }
                Event::Start(tag) => stack.push(Frame::Element {
                    label: tag_label(&tag),
                    children: Vec::new(),
                }),
                Event::End(_) => {
                    // The root frame is never popped by a balanced event stream
                    if stack.len() > 1 {
                        if let Some(frame) = stack.pop() {
                            push_child(&mut stack, frame.into_node());
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some(Frame::Code { literal, .. }) = stack.last_mut() {
                        literal.push_str(&text);
                    } else {
                        push_child(&mut stack, Node::other(format!("Text {:?}", text.as_ref()), Vec::new()));
                    }
                }
                Event::Code(text) => {
                    push_child(&mut stack, Node::other(format!("Code {:?}", text.as_ref()), Vec::new()));
                }
                Event::Html(text) | Event::InlineHtml(text) => {
                    push_child(&mut stack, Node::other(format!("Html {:?}", text.as_ref()), Vec::new()));
                }
                Event::SoftBreak => push_child(&mut stack, Node::other("SoftLineBreak", Vec::new())),
                Event::HardBreak => push_child(&mut stack, Node::other("HardLineBreak", Vec::new())),
                Event::Rule => push_child(&mut stack, Node::other("ThematicBreak", Vec::new())),
                Event::TaskListMarker(checked) => {
                    push_child(&mut stack, Node::other(format!("TaskListMarker({checked})"), Vec::new()));
                }
                Event::FootnoteReference(label) => {
                    push_child(&mut stack, Node::other(format!("FootnoteReference({label})"), Vec::new()));
                }
                _ => {}
            }
        }

        // Unwind anything left open (should not happen with pulldown-cmark)
        while stack.len() > 1 {
            if let Some(frame) = stack.pop() {
                push_child(&mut stack, frame.into_node());
            }
        }

        stack
            .pop()
            .map(Frame::into_node)
            .unwrap_or_else(Node::empty_document)
    }

    /// Children of this node (code blocks have none)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::FencedCodeBlock { .. } => &[],
            Node::Other { children, .. } => children,
        }
    }

    /// Textual dump of the tree, one node per line, indented two spaces per level
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Node::FencedCodeBlock { language, literal } => {
                let _ = writeln!(out, "{indent}FencedCodeBlock[{language}] {:?}", literal);
            }
            Node::Other { label, children } => {
                let _ = writeln!(out, "{indent}{label}");
                for child in children {
                    child.dump_into(out, depth + 1);
                }
            }
        }
    }
}

enum Frame {
    Element { label: String, children: Vec<Node> },
    Code { language: Option<String>, literal: String },
}

impl Frame {
    fn into_node(self) -> Node {
        match self {
            Frame::Element { label, children } => Node::Other { label, children },
            Frame::Code {
                language: Some(language),
                literal,
            } => Node::FencedCodeBlock { language, literal },
            Frame::Code {
                language: None,
                literal,
            } => Node::other(format!("IndentedCodeBlock {:?}", literal), Vec::new()),
        }
    }
}

fn push_child(stack: &mut [Frame], node: Node) {
    match stack.last_mut() {
        Some(Frame::Element { children, .. }) => children.push(node),
        // Code frames only ever receive text
        Some(Frame::Code { .. }) | None => {}
    }
}

/// First word of a fence info string (`rust ignore` -> `rust`)
fn fence_language(info: &str) -> String {
    info.split_whitespace().next().unwrap_or_default().to_string()
}

fn tag_label(tag: &Tag<'_>) -> String {
    match tag {
        Tag::Paragraph => "Paragraph".to_string(),
        Tag::Heading { level, .. } => format!("Heading[{}]", heading_level(*level)),
        Tag::BlockQuote(_) => "BlockQuote".to_string(),
        Tag::HtmlBlock => "HtmlBlock".to_string(),
        Tag::List(Some(start)) => format!("OrderedList[{start}]"),
        Tag::List(None) => "BulletList".to_string(),
        Tag::Item => "ListItem".to_string(),
        Tag::FootnoteDefinition(label) => format!("FootnoteDefinition[{label}]"),
        Tag::Table(_) => "Table".to_string(),
        Tag::TableHead => "TableHead".to_string(),
        Tag::TableRow => "TableRow".to_string(),
        Tag::TableCell => "TableCell".to_string(),
        Tag::Emphasis => "Emphasis".to_string(),
        Tag::Strong => "StrongEmphasis".to_string(),
        Tag::Strikethrough => "Strikethrough".to_string(),
        Tag::Link { dest_url, .. } => format!("Link[{dest_url}]"),
        Tag::Image { dest_url, .. } => format!("Image[{dest_url}]"),
        _ => "Block".to_string(),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
