//! Listing feed model.
//!
//! One page of a listing response: feed-level metadata, paging counters, the
//! next-page link, and the normalized entries.

use gdata_document::{DocumentNode, Fragment};
use gdata_entry::Entry;

/// One parsed feed page.
#[derive(Clone, Debug, Default)]
pub struct Feed {
    pub id: Option<String>,
    pub title: Option<String>,
    pub updated: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub total_results: Option<u32>,
    pub start_index: Option<u32>,
    pub items_per_page: Option<u32>,
    /// Absolute URI of the next page, when the service reports one.
    pub next_uri: Option<String>,
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn from_document(document: &Fragment) -> Self {
        let author = document.get("author").and_then(DocumentNode::as_fragment);

        let entries = match document.get("entry").or_else(|| document.get("atom:entry")) {
            Some(node) => node.clone().into_list().iter().map(Entry::from_node).collect(),
            None => Vec::new(),
        };

        Feed {
            id: field_text(document, "id"),
            title: field_text(document, "title"),
            updated: field_text(document, "updated"),
            author_name: author.and_then(|a| a.get("name")).and_then(text),
            author_email: author.and_then(|a| a.get("email")).and_then(text),
            total_results: counter(document, "openSearch:totalResults"),
            start_index: counter(document, "openSearch:startIndex"),
            items_per_page: counter(document, "openSearch:itemsPerPage"),
            next_uri: next_link(document),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn text(node: &DocumentNode) -> Option<String> {
    node.text_value().map(str::to_owned)
}

fn field_text(document: &Fragment, key: &str) -> Option<String> {
    document.get(key).and_then(text)
}

fn counter(document: &Fragment, key: &str) -> Option<u32> {
    document
        .get(key)
        .and_then(DocumentNode::text_value)
        .and_then(|value| value.parse().ok())
}

fn next_link(document: &Fragment) -> Option<String> {
    let links = document.get("link")?.clone().into_list();
    links
        .iter()
        .find(|link| link.attr("rel") == Some("next"))
        .and_then(|link| link.attr("href"))
        .map(str::to_owned)
}
