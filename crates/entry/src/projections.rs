//! Typed projections derived from normalized extension fields.
//!
//! Each extractor walks one extension field list and maps every raw node to a
//! typed record. A record whose required sub-fields are missing is omitted
//! with a warning; the rest of the entry is never aborted. Unexpected node
//! shapes are treated as absent values.

use gdata_document::DocumentNode;
use serde::{Deserialize, Serialize};

use crate::constants::{EDIT_REL, PHOTO_REL_SUFFIX};

/// One postal address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub formatted: Option<String>,
    pub line: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub pobox: Option<String>,
    pub country: Option<String>,
    pub label: Option<String>,
}

/// One email address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    pub label: Option<String>,
}

/// One phone-like number (plain, mobile, or fax).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    pub text: String,
    pub label: String,
}

/// One website link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteEntry {
    pub href: String,
    pub label: Option<String>,
}

/// One group membership reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    /// Last path segment of the membership href.
    pub group_id: String,
    pub group_href: String,
}

/// Organization affiliation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: Option<String>,
    pub title: Option<String>,
    pub primary: bool,
}

/// Phone-like numbers classified by resolved label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhoneBuckets {
    pub phones: Vec<PhoneEntry>,
    pub mobiles: Vec<PhoneEntry>,
    pub fax_numbers: Vec<PhoneEntry>,
}

/// Last `#`-segment of a relation scheme, underscores turned into spaces.
///
/// `http://schemas.google.com/g/2005#home_fax` resolves to `home fax`.
pub fn scheme_label(rel: &str) -> String {
    let segment = rel.rsplit('#').next().unwrap_or(rel);
    segment.replace('_', " ")
}

/// Resolve the type label of a raw node: relation scheme first, free-text
/// label attribute second, absent otherwise.
pub fn resolve_label(node: &DocumentNode) -> Option<String> {
    match node.attr("rel") {
        Some(rel) => Some(scheme_label(rel)),
        None => node.attr("label").map(str::to_owned),
    }
}

fn child_text(node: &DocumentNode, key: &str) -> Option<String> {
    node.as_fragment()
        .and_then(|fragment| fragment.get(key))
        .and_then(DocumentNode::text_value)
        .map(str::to_owned)
}

/// Country can arrive as plain text, attributed text with a `code`
/// attribute, or a map carrying a `code` key. Any other shape is treated as
/// country-absent rather than guessed at.
fn resolve_country(node: &DocumentNode) -> Option<String> {
    match node {
        DocumentNode::Text { value, attributes } => attributes
            .iter()
            .find(|(name, _)| name == "code")
            .map(|(_, code)| code.clone())
            .or_else(|| (!value.is_empty()).then(|| value.clone())),
        DocumentNode::Fragment(_) => node.attr("code").map(str::to_owned),
        DocumentNode::List(_) => None,
    }
}

pub fn extract_addresses(nodes: &[DocumentNode]) -> Vec<Address> {
    nodes
        .iter()
        .map(|node| Address {
            formatted: child_text(node, "gd:formattedAddress"),
            line: child_text(node, "gd:street"),
            line2: child_text(node, "gd:neighborhood"),
            city: child_text(node, "gd:city"),
            region: child_text(node, "gd:region"),
            postcode: child_text(node, "gd:postcode"),
            pobox: child_text(node, "gd:pobox"),
            country: node
                .as_fragment()
                .and_then(|fragment| fragment.get("gd:country"))
                .and_then(resolve_country),
            label: resolve_label(node),
        })
        .collect()
}

pub fn extract_emails(nodes: &[DocumentNode]) -> Vec<EmailAddress> {
    nodes
        .iter()
        .filter_map(|node| match node.attr("address") {
            Some(address) => Some(EmailAddress {
                address: address.to_owned(),
                label: resolve_label(node),
            }),
            None => {
                tracing::warn!("dropping email node without an address attribute");
                None
            }
        })
        .collect()
}

/// Classify phone-like numbers into plain/mobile/fax buckets by
/// case-insensitive substring match on the resolved label. Nodes lacking a
/// recoverable text or label are dropped.
pub fn extract_phones(nodes: &[DocumentNode]) -> PhoneBuckets {
    let mut buckets = PhoneBuckets::default();
    for node in nodes {
        let (Some(text), Some(label)) = (node.text_value(), resolve_label(node)) else {
            tracing::warn!("dropping phone node without text or type label");
            continue;
        };
        let entry = PhoneEntry {
            text: text.to_owned(),
            label: label.clone(),
        };
        let folded = label.to_lowercase();
        if folded.contains("mobile") {
            buckets.mobiles.push(entry);
        } else if folded.contains("fax") {
            buckets.fax_numbers.push(entry);
        } else {
            buckets.phones.push(entry);
        }
    }
    buckets
}

pub fn extract_websites(nodes: &[DocumentNode]) -> Vec<WebsiteEntry> {
    nodes
        .iter()
        .filter_map(|node| match node.attr("href") {
            Some(href) => Some(WebsiteEntry {
                href: href.to_owned(),
                label: resolve_label(node),
            }),
            None => {
                tracing::warn!("dropping website node without an href attribute");
                None
            }
        })
        .collect()
}

/// Extract group membership references.
///
/// Returns the references plus a flag raised when any membership node is
/// marked deleted on the wire; the caller applies the forced delete intent
/// once, keeping the effect visible instead of a hidden side channel.
pub fn extract_groups(nodes: &[DocumentNode]) -> (Vec<GroupRef>, bool) {
    let mut refs = Vec::new();
    let mut forces_delete = false;
    for node in nodes {
        if node.attr("deleted") == Some("true") {
            forces_delete = true;
        }
        let Some(href) = node.attr("href") else {
            tracing::warn!("dropping group membership node without an href attribute");
            continue;
        };
        refs.push(GroupRef {
            group_id: href.rsplit('/').next().unwrap_or(href).to_owned(),
            group_href: href.to_owned(),
        });
    }
    (refs, forces_delete)
}

/// Pick the primary-flagged organization node, falling back to the first.
pub fn extract_organization(nodes: &[DocumentNode]) -> Option<Organization> {
    let chosen = nodes
        .iter()
        .find(|node| node.attr("primary").is_some())
        .or_else(|| nodes.first())?;
    Some(Organization {
        name: child_text(chosen, "gd:orgName"),
        title: child_text(chosen, "gd:orgTitle"),
        primary: chosen.attr("primary") == Some("true"),
    })
}

/// First birthday node's `when` attribute, if any.
pub fn extract_birthday(nodes: &[DocumentNode]) -> Option<String> {
    nodes.first()?.attr("when").map(str::to_owned)
}

/// Scan the link list once for the edit endpoint and a usable photo link.
///
/// A photo link without an etag attribute points at a default silhouette and
/// is not treated as usable.
pub fn extract_links(nodes: &[DocumentNode]) -> (Option<String>, Option<String>) {
    let mut edit_uri = None;
    let mut photo_uri = None;
    for node in nodes {
        let (Some(rel), Some(href)) = (node.attr("rel"), node.attr("href")) else {
            continue;
        };
        if rel == EDIT_REL {
            edit_uri = Some(href.to_owned());
        } else if rel.ends_with(PHOTO_REL_SUFFIX) && node.attr("gd:etag").is_some() {
            photo_uri = Some(href.to_owned());
        }
    }
    (edit_uri, photo_uri)
}
