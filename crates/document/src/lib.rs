//! Generic document tree for the feed wire format.
//!
//! This crate holds the loosely-typed document representation produced by an
//! external XML tree-builder and consumed by the entry mapping engine:
//! - [`DocumentNode`]: tagged union of text leaf, ordered field map, and list
//! - [`Fragment`]: insertion-ordered field storage with shape-dispatch helpers
//! - [`render`]: generic tag emission back to XML text
//!
//! Protocol meaning lives in `gdata-entry`. This crate handles document shape
//! only and knows nothing about contacts, groups, or batch envelopes.

pub mod node;
pub mod render;

pub use node::{DocumentNode, Fragment};
pub use render::{escape_xml, render_document, render_tag};
