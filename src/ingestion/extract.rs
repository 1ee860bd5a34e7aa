//! Markup-to-text extraction.

use ego_tree::NodeRef;
use scraper::{Html, node::Node};

use crate::types::ExtractError;

/// Containers whose text is never page content.
const SKIPPED_CONTAINERS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Extracts the visible text of an HTML document.
///
/// Text nodes are collected in document order and joined by newlines, one
/// segment per node, mirroring how the page partitions into structural
/// elements. A document whose extraction is empty or whitespace-only yields
/// [`ExtractError::EmptyContent`] — an empty page is not worth indexing and
/// silently succeeding would poison retrieval with blank records.
pub fn extract_text(html: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);

    let mut segments: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        if node.ancestors().any(is_skipped_container) {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed);
        }
    }

    if segments.is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(segments.join("\n"))
}

fn is_skipped_container(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Element(element) => SKIPPED_CONTAINERS.contains(&element.name()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_elements_in_document_order() {
        let html = r#"
            <html><body>
                <h1>Title</h1>
                <p>First paragraph.</p>
                <div><p>Second paragraph.</p></div>
            </body></html>
        "#;
        let text = extract_text(html).unwrap();
        assert_eq!(text, "Title\nFirst paragraph.\nSecond paragraph.");
    }

    #[test]
    fn skips_script_and_style_content() {
        let html = r#"
            <html>
            <head><title>ignored</title><style>p { color: red; }</style></head>
            <body>
                <script>console.log("not content");</script>
                <p>Visible.</p>
            </body></html>
        "#;
        let text = extract_text(html).unwrap();
        assert_eq!(text, "Visible.");
    }

    #[test]
    fn empty_markup_is_an_error() {
        assert!(matches!(extract_text(""), Err(ExtractError::EmptyContent)));
    }

    #[test]
    fn whitespace_only_markup_is_an_error() {
        let html = "<html><body><p>   </p><div>\n\t</div></body></html>";
        assert!(matches!(
            extract_text(html),
            Err(ExtractError::EmptyContent)
        ));
    }

    #[test]
    fn plain_text_without_tags_still_extracts() {
        // The parser wraps bare text in an implied body.
        let text = extract_text("just some words").unwrap();
        assert_eq!(text, "just some words");
    }
}
