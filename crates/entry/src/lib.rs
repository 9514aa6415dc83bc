//! Entry mapping engine for the contacts/groups feed protocol.
//!
//! This crate translates between the generic wire document tree
//! (`gdata-document`) and the typed [`Entry`] model:
//! - [`entry`]: the canonical entry, its normalizer, and mutation intents
//! - [`projections`]: typed records derived from extension fields
//! - [`views`]: label-keyed grouped views over the projections
//! - [`serialize`]: entry back to wire document, with delete/batch semantics
//! - [`batch`]: batch envelope encoding and response demultiplexing
//!
//! Transport and pagination live in `gdata-client`. This crate never touches
//! the network and never fails on malformed input: bad records are dropped
//! with a warning and the rest of the entry survives.

pub mod batch;
pub mod constants;
pub mod entry;
pub mod projections;
pub mod serialize;
pub mod views;

pub use batch::{decode_batch, encode_batch, BatchCounts, BatchResult};
pub use entry::{Entry, ExtensionFields, Intent};
pub use projections::{
    Address, EmailAddress, GroupRef, Organization, PhoneEntry, WebsiteEntry,
};
pub use views::GroupedView;

use gdata_document::DocumentNode;

/// Parse one entry from a wire document node.
///
/// Convenience wrapper over [`Entry::from_node`]; tolerant of any node
/// shape.
pub fn parse_entry(node: &DocumentNode) -> Entry {
    Entry::from_node(node)
}
