//! Fenced code block language scanning

use crate::ast::Node;

/// Collect the language tags of all fenced code blocks in document order.
///
/// Empty tags are skipped. Duplicates are kept: first-use ordering is decided
/// later by the dependency resolver.
pub fn code_languages(root: &Node) -> Vec<String> {
    let mut languages = Vec::new();
    collect(root, &mut languages);
    languages
}

fn collect(node: &Node, out: &mut Vec<String>) {
    match node {
        Node::FencedCodeBlock { language, .. } => {
            if !language.is_empty() {
                out.push(language.clone());
            }
        }
        Node::Other { children, .. } => {
            for child in children {
                collect(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_code_blocks() {
        let root = Node::parse("# Title\n\nJust text.\n");
        assert!(code_languages(&root).is_empty());
    }

    #[test]
    fn test_document_order_with_duplicates() {
        let root = Node::parse("```jsx\na\n```\n\n```python\nb\n```\n\n```jsx\nc\n```\n");
        assert_eq!(code_languages(&root), vec!["jsx", "python", "jsx"]);
    }

    #[test]
    fn test_empty_language_skipped() {
        let root = Node::parse("```\nplain\n```\n\n```css\na {}\n```\n");
        assert_eq!(code_languages(&root), vec!["css"]);
    }

    #[test]
    fn test_nested_blocks_found() {
        let root = Node::other(
            "Document",
            vec![
                Node::other("BlockQuote", vec![Node::code_block("go")]),
                Node::code_block("rust"),
            ],
        );
        assert_eq!(code_languages(&root), vec!["go", "rust"]);
    }
}
