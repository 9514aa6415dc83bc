//! Batch envelope encoding and response demultiplexing.
//!
//! Encoding wraps N intent-flagged entries into one feed document; decoding
//! runs every response entry through the full single-entry parse pipeline so
//! each item carries its own [`BatchResult`]. A partial failure never aborts
//! sibling items.

use gdata_document::{DocumentNode, Fragment};
use serde::{Deserialize, Serialize};

use crate::constants::{ATOM_NS, BATCH_NS, GCONTACT_NS, GD_NS};
use crate::entry::Entry;

/// Per-item outcome of a batch submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Operation name echoed back ("create", "update", "delete"), or
    /// "interrupted" when the service stopped mid-feed.
    pub status: Option<String>,
    /// Status code as wire text (e.g. "201", "400").
    pub code: Option<String>,
    pub reason: Option<String>,
    /// Operation type attribute (e.g. "insert").
    pub operation: Option<String>,
    /// Present only on an interrupted feed.
    pub counts: Option<BatchCounts>,
}

/// Feed-level accounting reported on an interrupted batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub parsed: u32,
    pub success: u32,
    pub error: u32,
    pub unprocessed: u32,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.code.as_deref(), Some(code) if code.starts_with('2'))
    }

    /// Fold one `batch:`-namespaced field into the result.
    ///
    /// `suffix` is the field key with the namespace prefix stripped. The
    /// status field's code/reason read from either an attributed leaf or a
    /// field map, whichever shape the wire carried.
    pub(crate) fn absorb(&mut self, suffix: &str, node: &DocumentNode) {
        match suffix {
            "interrupted" => {
                self.status = Some("interrupted".to_owned());
                self.code = Some("400".to_owned());
                self.reason = node.attr("reason").map(str::to_owned);
                self.counts = Some(BatchCounts {
                    parsed: count_attr(node, "parsed"),
                    success: count_attr(node, "success"),
                    error: count_attr(node, "error"),
                    unprocessed: count_attr(node, "unprocessed"),
                });
            }
            "id" => self.status = node.text_value().map(str::to_owned),
            "status" => {
                self.code = node.attr("code").map(str::to_owned);
                self.reason = node.attr("reason").map(str::to_owned);
            }
            "operation" => self.operation = node.attr("type").map(str::to_owned),
            _ => {}
        }
    }
}

fn count_attr(node: &DocumentNode, name: &str) -> u32 {
    node.attr(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Wrap `entries` into one batch request feed.
///
/// Each entry is serialized with its batch envelope; the feed root carries
/// the atom, extension, and batch namespace declarations.
pub fn encode_batch(entries: &[Entry]) -> DocumentNode {
    let mut feed = Fragment::new();
    feed.set("@xmlns", DocumentNode::text(ATOM_NS));
    feed.set("@xmlns:gContact", DocumentNode::text(GCONTACT_NS));
    feed.set("@xmlns:gd", DocumentNode::text(GD_NS));
    feed.set("@xmlns:batch", DocumentNode::text(BATCH_NS));
    feed.set(
        "atom:entry",
        DocumentNode::List(entries.iter().map(|entry| entry.to_document(true)).collect()),
    );
    DocumentNode::Fragment(feed)
}

/// Demultiplex a batch response feed into per-item entries, in feed order.
///
/// The service guarantees response order matches submission order; callers
/// compare counts and surface a mismatch rather than reordering.
pub fn decode_batch(feed: &Fragment) -> Vec<Entry> {
    let Some(node) = feed.get("entry").or_else(|| feed.get("atom:entry")) else {
        return Vec::new();
    };
    node.clone()
        .into_list()
        .iter()
        .map(Entry::from_node)
        .collect()
}
