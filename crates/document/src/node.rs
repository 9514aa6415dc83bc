//! Tagged-union document nodes with ordered field storage.
//!
//! A wire field may arrive as a bare string, an attributed string, a single
//! map, or a list of maps. Everything downstream pattern-matches on the
//! [`DocumentNode`] tag instead of probing for capabilities, and unexpected
//! shapes degrade to "absent" rather than erroring.
//!
//! Attribute keys inside a [`Fragment`] carry a leading `@` (the tree-builder
//! convention, e.g. `@rel`, `@gd:etag`); the synthetic `text` key holds the
//! textual value of a leaf that has been flattened into attribute-map form.

use serde::{Deserialize, Serialize};

/// Marker prefix distinguishing attribute keys from child-element keys
/// inside a [`Fragment`].
pub const ATTR_MARKER: char = '@';

/// Key under which a flattened leaf's textual value is stored.
pub const TEXT_KEY: &str = "text";

/// One parsed document fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentNode {
    /// Text leaf with ordered attributes.
    Text {
        value: String,
        attributes: Vec<(String, String)>,
    },
    /// Ordered field map.
    Fragment(Fragment),
    /// Ordered list of nodes.
    List(Vec<DocumentNode>),
}

impl DocumentNode {
    /// Plain text leaf without attributes.
    pub fn text(value: impl Into<String>) -> Self {
        DocumentNode::Text {
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    /// Text leaf carrying attributes.
    pub fn text_with_attrs<I, K, V>(value: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        DocumentNode::Text {
            value: value.into(),
            attributes: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Textual value of this node, if it has one.
    ///
    /// Dispatches on shape: a `Text` leaf yields its value, a `Fragment`
    /// yields its synthetic `text` field, a `List` yields nothing.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            DocumentNode::Text { value, .. } => Some(value),
            DocumentNode::Fragment(fragment) => match fragment.get(TEXT_KEY) {
                Some(DocumentNode::Text { value, .. }) => Some(value),
                _ => None,
            },
            DocumentNode::List(_) => None,
        }
    }

    /// Attribute lookup across both attributed-leaf and field-map shapes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            DocumentNode::Text { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            DocumentNode::Fragment(fragment) => fragment
                .get(&format!("{ATTR_MARKER}{name}"))
                .and_then(DocumentNode::text_value),
            DocumentNode::List(_) => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            DocumentNode::Fragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    /// Canonicalize cardinality: a `List` yields its items, any other node
    /// becomes a one-element list. Models the wire reality that
    /// cardinality-1 fields serialize without a wrapping list.
    pub fn into_list(self) -> Vec<DocumentNode> {
        match self {
            DocumentNode::List(items) => items,
            other => vec![other],
        }
    }

    /// Flatten into attribute-map form: a `Text` leaf becomes a `Fragment`
    /// holding the synthetic `text` key plus one `@`-marked key per
    /// attribute. A `Fragment` passes through; any other shape degrades to
    /// an empty fragment (tolerance for malformed input).
    pub fn into_flat_fragment(self) -> Fragment {
        match self {
            DocumentNode::Fragment(fragment) => fragment,
            DocumentNode::Text { value, attributes } => {
                let mut fragment = Fragment::new();
                fragment.set(TEXT_KEY, DocumentNode::text(value));
                for (key, attr_value) in attributes {
                    fragment.set(
                        format!("{ATTR_MARKER}{key}"),
                        DocumentNode::text(attr_value),
                    );
                }
                fragment
            }
            DocumentNode::List(_) => Fragment::new(),
        }
    }
}

impl From<Fragment> for DocumentNode {
    fn from(fragment: Fragment) -> Self {
        DocumentNode::Fragment(fragment)
    }
}

/// Insertion-ordered field map.
///
/// Keys are unique; setting an existing key replaces its value in place so
/// field order survives mutation. Order preservation is a correctness
/// requirement for faithful round-tripping, not a nicety.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    fields: Vec<(String, DocumentNode)>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&DocumentNode> {
        self.fields
            .iter()
            .find(|(field_key, _)| field_key == key)
            .map(|(_, node)| node)
    }

    /// Replace the value under `key`, or append the field if absent.
    pub fn set(&mut self, key: impl Into<String>, node: DocumentNode) {
        let key = key.into();
        match self.fields.iter_mut().find(|(field_key, _)| *field_key == key) {
            Some((_, slot)) => *slot = node,
            None => self.fields.push((key, node)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<DocumentNode> {
        let index = self.fields.iter().position(|(field_key, _)| field_key == key)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentNode)> {
        self.fields.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `key` is an attribute key (`@`-marked).
    pub fn is_attr_key(key: &str) -> bool {
        key.starts_with(ATTR_MARKER)
    }
}

impl<K: Into<String>> FromIterator<(K, DocumentNode)> for Fragment {
    fn from_iter<I: IntoIterator<Item = (K, DocumentNode)>>(iter: I) -> Self {
        let mut fragment = Fragment::new();
        for (key, node) in iter {
            fragment.set(key, node);
        }
        fragment
    }
}
