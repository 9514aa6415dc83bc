//! Generic tag emission back to XML text.
//!
//! Inverse of the external tree-builder: walks a [`DocumentNode`] and writes
//! nested tags with `@`-marked keys inlined as attributes. Indentation is a
//! formatting detail only; nesting is the correctness contract.

use crate::node::{DocumentNode, Fragment, TEXT_KEY};

/// Escape text for element content and attribute values.
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render one node under `tag`, appending to `out`.
///
/// A `List` emits one tag per element; a leaf collapses to
/// `<tag ...>text</tag>`; an attribute-only fragment self-closes; anything
/// else recurses into child tags nested under the parent.
pub fn render_tag(out: &mut String, tag: &str, node: &DocumentNode, indent: usize) {
    match node {
        DocumentNode::List(items) => {
            for item in items {
                render_tag(out, tag, item, indent);
            }
        }
        DocumentNode::Text { value, attributes } => {
            pad(out, indent);
            out.push('<');
            out.push_str(tag);
            for (name, attr_value) in attributes {
                push_attr(out, name, attr_value);
            }
            out.push('>');
            out.push_str(&escape_xml(value));
            out.push_str("</");
            out.push_str(tag);
            out.push_str(">\n");
        }
        DocumentNode::Fragment(fragment) => render_fragment(out, tag, fragment, indent),
    }
}

/// Render an entire document rooted at `tag`.
pub fn render_document(tag: &str, node: &DocumentNode) -> String {
    let mut out = String::new();
    render_tag(&mut out, tag, node, 0);
    out
}

fn render_fragment(out: &mut String, tag: &str, fragment: &Fragment, indent: usize) {
    pad(out, indent);
    out.push('<');
    out.push_str(tag);

    for (key, node) in fragment.iter() {
        if let Some(name) = key.strip_prefix('@') {
            push_attr(out, name, node.text_value().unwrap_or(""));
        }
    }

    let children: Vec<(&str, &DocumentNode)> = fragment
        .iter()
        .filter(|(key, _)| !Fragment::is_attr_key(key))
        .collect();

    // A lone synthetic text key collapses back to a plain leaf.
    if let [(TEXT_KEY, text_node)] = children[..] {
        out.push('>');
        out.push_str(&escape_xml(text_node.text_value().unwrap_or("")));
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
        return;
    }

    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    for (key, child) in children {
        render_tag(out, key, child, indent + 2);
    }
    pad(out, indent);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("='");
    out.push_str(&escape_xml(value));
    out.push('\'');
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_leaf() {
        let out = render_document("atom:title", &DocumentNode::text("Foo Title"));
        assert_eq!(out, "<atom:title>Foo Title</atom:title>\n");
    }

    #[test]
    fn escapes_text_and_attributes() {
        let node = DocumentNode::text_with_attrs("Tom & Jerry", [("label", "a<b")]);
        let out = render_document("atom:title", &node);
        assert_eq!(out, "<atom:title label='a&lt;b'>Tom &amp; Jerry</atom:title>\n");
    }

    #[test]
    fn attribute_only_fragment_self_closes() {
        let node = DocumentNode::Fragment(
            [
                ("@deleted", DocumentNode::text("false")),
                ("@href", DocumentNode::text("http://example.com/base/6")),
            ]
            .into_iter()
            .collect(),
        );
        let out = render_document("gContact:groupMembershipInfo", &node);
        assert_eq!(
            out,
            "<gContact:groupMembershipInfo deleted='false' href='http://example.com/base/6'/>\n"
        );
    }

    #[test]
    fn lone_text_key_collapses_to_leaf() {
        let node = DocumentNode::Fragment(
            [
                ("@rel", DocumentNode::text("#mobile")),
                ("text", DocumentNode::text("3005004000")),
            ]
            .into_iter()
            .collect(),
        );
        let out = render_document("gd:phoneNumber", &node);
        assert_eq!(out, "<gd:phoneNumber rel='#mobile'>3005004000</gd:phoneNumber>\n");
    }

    #[test]
    fn nested_fragments_indent_children() {
        let name = DocumentNode::Fragment(
            [
                ("gd:givenName", DocumentNode::text("John")),
                ("gd:familyName", DocumentNode::text("Doe")),
            ]
            .into_iter()
            .collect(),
        );
        let root = DocumentNode::Fragment([("gd:name", name)].into_iter().collect());
        let out = render_document("atom:entry", &root);
        assert_eq!(
            out,
            "<atom:entry>\n  <gd:name>\n    <gd:givenName>John</gd:givenName>\n    <gd:familyName>Doe</gd:familyName>\n  </gd:name>\n</atom:entry>\n"
        );
    }

    #[test]
    fn list_emits_one_tag_per_element() {
        let node = DocumentNode::List(vec![
            DocumentNode::text_with_attrs("", [("address", "a@example.com")]),
            DocumentNode::text_with_attrs("", [("address", "b@example.com")]),
        ]);
        let out = render_document("gd:email", &node);
        assert_eq!(out.matches("<gd:email").count(), 2);
    }
}
