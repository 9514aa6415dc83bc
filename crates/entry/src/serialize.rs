//! Entry serialization back into the wire document.
//!
//! Inverse of the normalizer: a canonical [`Entry`] becomes the `atom:entry`
//! fragment the service expects, honoring the pending intent and the optional
//! batch envelope. A delete-flagged entry serializes to its identity only.

use gdata_document::{render_document, DocumentNode, Fragment};

use crate::constants::{
    ATOM_NS, CATEGORY_SCHEME, CATEGORY_TERM_PREFIX, GCONTACT_NS, GD_NS, GROUP_FIELD,
};
use crate::entry::{Entry, Intent};

impl Entry {
    /// Serialize into the wire fragment, optionally wrapped for a batch
    /// feed. May be called any number of times; the entry is not consumed.
    pub fn to_document(&self, as_batch_item: bool) -> DocumentNode {
        let mut root = Fragment::new();
        root.set("@xmlns:atom", DocumentNode::text(ATOM_NS));
        root.set("@xmlns:gd", DocumentNode::text(GD_NS));
        root.set("@xmlns:gContact", DocumentNode::text(GCONTACT_NS));
        if let Some(etag) = self.etag() {
            root.set("@gd:etag", DocumentNode::text(etag));
        }

        if as_batch_item {
            let name = self.intent().map(Intent::wire_name).unwrap_or_default();
            let operation = self.intent().map(Intent::operation_type).unwrap_or_default();
            root.set("batch:id", DocumentNode::text(name));
            root.set(
                "batch:operation",
                DocumentNode::Fragment(
                    [("@type", DocumentNode::text(operation))].into_iter().collect(),
                ),
            );
        }

        if let Some(id) = self.id() {
            // The service echoes /base/ ids but expects /full/ on mutation.
            root.set("id", DocumentNode::text(id.replace("/base/", "/full/")));
        }

        // A delete carries identity only; everything else is suppressed
        // even when populated.
        if self.intent() == Some(Intent::Delete) {
            return DocumentNode::Fragment(root);
        }

        if let Some(category) = self.category() {
            root.set(
                "atom:category",
                DocumentNode::Fragment(
                    [
                        ("@scheme", DocumentNode::text(CATEGORY_SCHEME)),
                        (
                            "@term",
                            DocumentNode::text(format!("{CATEGORY_TERM_PREFIX}{category}")),
                        ),
                    ]
                    .into_iter()
                    .collect(),
                ),
            );
        }
        root.set(
            "atom:content",
            DocumentNode::text_with_attrs(self.content().unwrap_or_default(), [("type", "text")]),
        );
        root.set(
            "atom:title",
            DocumentNode::text(self.title().unwrap_or_default()),
        );
        if let Some(group_ref) = self.group_ref() {
            root.set(
                GROUP_FIELD,
                DocumentNode::Fragment(
                    [
                        ("@deleted", DocumentNode::text("false")),
                        ("@href", DocumentNode::text(group_ref)),
                    ]
                    .into_iter()
                    .collect(),
                ),
            );
        }

        for (key, nodes) in self.extension_fields().iter() {
            let value = match nodes {
                [single] => single.clone(),
                many => DocumentNode::List(many.to_vec()),
            };
            root.set(key, value);
        }

        DocumentNode::Fragment(root)
    }

    /// Serialize to XML text (no prolog; byte-level framing is the
    /// caller's concern).
    pub fn to_xml(&self, as_batch_item: bool) -> String {
        render_document("atom:entry", &self.to_document(as_batch_item))
    }
}
