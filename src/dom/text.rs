use super::{Dom, NodeId, NodeKind};

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Plain text of a subtree where `<br>` and block boundaries become `\n`.
///
/// Used to compare multi-line values, whose stored form is newline separated,
/// against markup that renders each line as its own block.
pub fn flatten_text(dom: &dyn Dom, node: NodeId) -> String {
    let mut out = String::new();
    flatten_into(dom, node, &mut out);
    out
}

fn flatten_into(dom: &dyn Dom, node: NodeId, out: &mut String) {
    for child in dom.children(node) {
        match dom.node_kind(child) {
            NodeKind::Text => out.push_str(&dom.text_content(child)),
            NodeKind::Element => {
                let tag = dom.tag_name(child);
                if tag == "br" {
                    out.push('\n');
                    continue;
                }
                if is_block_tag(&tag) && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                flatten_into(dom, child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn blocks_and_breaks_become_newlines() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let root = dom.element(body, "div");
        let first = dom.element(root, "p");
        dom.text(first, "first line");
        let second = dom.element(root, "p");
        dom.text(second, "second");
        dom.element(second, "br");
        dom.text(second, "third");
        assert_eq!(flatten_text(&dom, root), "first line\nsecond\nthird");
    }

    #[test]
    fn inline_markup_does_not_break_lines() {
        let mut dom = MemoryDom::default();
        let body = dom.body();
        let root = dom.element(body, "p");
        dom.text(root, "plain ");
        let strong = dom.element(root, "strong");
        dom.text(strong, "bold");
        dom.text(root, " tail");
        assert_eq!(flatten_text(&dom, root), "plain bold tail");
    }
}
