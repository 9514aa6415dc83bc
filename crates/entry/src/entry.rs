//! Canonical entry model and the normalizer walking a raw wire fragment.
//!
//! Responsibilities:
//! - Separate protocol-core fields from extension-namespaced fields
//! - Canonicalize extension field cardinality (scalar becomes one-element list)
//! - Route batch-envelope fields into the per-item [`BatchResult`]
//! - Recompute typed projections whenever the extension data changes
//!
//! An [`Entry`] is either parsed from a wire document or built empty for
//! client-side population before a create. Malformed input degrades to absent
//! fields; parsing never fails.

use gdata_document::{DocumentNode, Fragment};
use serde::Serialize;

use crate::batch::BatchResult;
use crate::constants::{
    ADDRESS_FIELD, BATCH_PREFIX, BIRTHDAY_FIELD, EMAIL_FIELD, EXTENSION_PREFIXES, GROUP_FIELD,
    ORGANIZATION_FIELD, PHONE_FIELD, WEBSITE_FIELD,
};
use crate::projections::{
    extract_addresses, extract_birthday, extract_emails, extract_groups, extract_links,
    extract_organization, extract_phones, extract_websites, Address, EmailAddress, GroupRef,
    Organization, PhoneEntry, WebsiteEntry,
};
use crate::views::GroupedView;

/// Pending mutation an entry carries before being sent to the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Intent {
    Create,
    Update,
    Delete,
}

impl Intent {
    /// Wire name used for the batch id leaf.
    pub fn wire_name(self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Update => "update",
            Intent::Delete => "delete",
        }
    }

    /// Batch operation type attribute; the service spells create "insert".
    pub fn operation_type(self) -> &'static str {
        match self {
            Intent::Create => "insert",
            Intent::Update => "update",
            Intent::Delete => "delete",
        }
    }
}

/// Insertion-ordered extension field storage: key to normalized node list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionFields {
    fields: Vec<(String, Vec<DocumentNode>)>,
}

impl ExtensionFields {
    pub fn get(&self, key: &str) -> Option<&[DocumentNode]> {
        self.fields
            .iter()
            .find(|(field_key, _)| field_key == key)
            .map(|(_, nodes)| nodes.as_slice())
    }

    pub fn set(&mut self, key: impl Into<String>, nodes: Vec<DocumentNode>) {
        let key = key.into();
        match self.fields.iter_mut().find(|(field_key, _)| *field_key == key) {
            Some((_, slot)) => *slot = nodes,
            None => self.fields.push((key, nodes)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<DocumentNode>> {
        let index = self.fields.iter().position(|(field_key, _)| field_key == key)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocumentNode])> {
        self.fields
            .iter()
            .map(|(key, nodes)| (key.as_str(), nodes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One contact or group record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Entry {
    id: Option<String>,
    etag: Option<String>,
    updated: Option<String>,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    edit_uri: Option<String>,
    photo_uri: Option<String>,
    group_ref: Option<String>,
    extension_fields: ExtensionFields,
    intent: Option<Intent>,
    /// Raised when a wire membership node arrived marked deleted; the
    /// forced delete intent then survives later create/update calls.
    delete_forced: bool,
    batch_result: Option<BatchResult>,

    // Typed projections, recomputed from extension_fields on every change.
    addresses: Vec<Address>,
    emails: Vec<EmailAddress>,
    phones: Vec<PhoneEntry>,
    mobiles: Vec<PhoneEntry>,
    fax_numbers: Vec<PhoneEntry>,
    websites: Vec<WebsiteEntry>,
    groups: Vec<GroupRef>,
    organization: Option<Organization>,
    birthday: Option<String>,
}

impl Entry {
    /// Empty entry for client-side population before a create.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an entry from any node shape; non-fragments yield an empty
    /// entry rather than an error.
    pub fn from_node(node: &DocumentNode) -> Self {
        match node.as_fragment() {
            Some(fragment) => Self::from_document(fragment),
            None => Self::new(),
        }
    }

    /// Parse one entry from its wire fragment.
    pub fn from_document(document: &Fragment) -> Self {
        let mut entry = Entry::new();

        entry.id = field_text(document, "id");
        entry.updated = field_text(document, "updated");
        entry.etag = document
            .get("@gd:etag")
            .and_then(DocumentNode::text_value)
            .map(str::to_owned);
        // Serialized entries spell the atom core fields with an explicit
        // prefix; listing responses use the default namespace.
        entry.title = field_text(document, "title").or_else(|| field_text(document, "atom:title"));
        entry.content =
            field_text(document, "content").or_else(|| field_text(document, "atom:content"));
        entry.category = document
            .get("category")
            .or_else(|| document.get("atom:category"))
            .and_then(|node| node.attr("term"))
            .map(category_label);

        for (key, node) in document.iter() {
            if EXTENSION_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
                let nodes = node
                    .clone()
                    .into_list()
                    .into_iter()
                    .map(|item| DocumentNode::Fragment(item.into_flat_fragment()))
                    .collect();
                entry.extension_fields.set(key, nodes);
            } else if let Some(suffix) = key.strip_prefix(BATCH_PREFIX) {
                entry
                    .batch_result
                    .get_or_insert_with(BatchResult::default)
                    .absorb(suffix, node);
            }
        }

        if let Some(links) = document.get("link").or_else(|| document.get("atom:link")) {
            let (edit_uri, photo_uri) = extract_links(&links.clone().into_list());
            entry.edit_uri = edit_uri;
            entry.photo_uri = photo_uri;
        }

        entry.refresh_projections();
        entry
    }

    // ------------------------------------------------------------------
    // Intent
    // ------------------------------------------------------------------

    /// Flag for creation. Only takes effect when the entry has no id yet;
    /// otherwise the intent is left unchanged.
    pub fn create(&mut self) {
        if self.id.is_none() && !self.delete_forced {
            self.intent = Some(Intent::Create);
        }
    }

    /// Flag for update. Requires an id; a forced wire delete is never
    /// overridden.
    pub fn update(&mut self) {
        if self.id.is_some() && !self.delete_forced {
            self.intent = Some(Intent::Update);
        }
    }

    /// Flag for deletion. Requires an id.
    pub fn delete(&mut self) {
        if self.id.is_some() {
            self.intent = Some(Intent::Delete);
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    /// Whether any of create/update/delete has taken effect.
    pub fn has_intent(&self) -> bool {
        self.intent.is_some()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn updated(&self) -> Option<&str> {
        self.updated.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn edit_uri(&self) -> Option<&str> {
        self.edit_uri.as_deref()
    }

    pub fn photo_uri(&self) -> Option<&str> {
        self.photo_uri.as_deref()
    }

    pub fn group_ref(&self) -> Option<&str> {
        self.group_ref.as_deref()
    }

    pub fn extension_fields(&self) -> &ExtensionFields {
        &self.extension_fields
    }

    pub fn batch_result(&self) -> Option<&BatchResult> {
        self.batch_result.as_ref()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn emails(&self) -> &[EmailAddress] {
        &self.emails
    }

    pub fn phones(&self) -> &[PhoneEntry] {
        &self.phones
    }

    pub fn mobiles(&self) -> &[PhoneEntry] {
        &self.mobiles
    }

    pub fn fax_numbers(&self) -> &[PhoneEntry] {
        &self.fax_numbers
    }

    pub fn websites(&self) -> &[WebsiteEntry] {
        &self.websites
    }

    pub fn groups(&self) -> &[GroupRef] {
        &self.groups
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    pub fn birthday(&self) -> Option<&str> {
        self.birthday.as_deref()
    }

    // ------------------------------------------------------------------
    // Grouped views (rebuilt on every call)
    // ------------------------------------------------------------------

    pub fn addresses_by_label(&self) -> GroupedView<Address> {
        GroupedView::collect(
            self.addresses
                .iter()
                .map(|address| (address.label.clone(), address.clone())),
        )
    }

    /// Email addresses only, keyed by label.
    pub fn emails_by_label(&self) -> GroupedView<String> {
        GroupedView::collect(
            self.emails
                .iter()
                .map(|email| (email.label.clone(), email.address.clone())),
        )
    }

    pub fn phones_by_label(&self) -> GroupedView<PhoneEntry> {
        Self::phone_view(&self.phones)
    }

    pub fn mobiles_by_label(&self) -> GroupedView<PhoneEntry> {
        Self::phone_view(&self.mobiles)
    }

    pub fn fax_numbers_by_label(&self) -> GroupedView<PhoneEntry> {
        Self::phone_view(&self.fax_numbers)
    }

    /// Website hrefs only, keyed by label.
    pub fn websites_by_label(&self) -> GroupedView<String> {
        GroupedView::collect(
            self.websites
                .iter()
                .map(|site| (site.label.clone(), site.href.clone())),
        )
    }

    fn phone_view(bucket: &[PhoneEntry]) -> GroupedView<PhoneEntry> {
        GroupedView::collect(
            bucket
                .iter()
                .map(|phone| (Some(phone.label.clone()), phone.clone())),
        )
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Category label ("contact" or "group").
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = Some(category.into());
    }

    /// Convenience group-membership href emitted alongside the extension
    /// fields on serialization.
    pub fn set_group_ref(&mut self, href: impl Into<String>) {
        self.group_ref = Some(href.into());
    }

    /// Store an extension field, normalizing each node into attribute-map
    /// form and recomputing the typed projections.
    pub fn set_extension_field(&mut self, key: impl Into<String>, nodes: Vec<DocumentNode>) {
        let nodes = nodes
            .into_iter()
            .map(|node| DocumentNode::Fragment(node.into_flat_fragment()))
            .collect();
        self.extension_fields.set(key, nodes);
        self.refresh_projections();
    }

    pub fn remove_extension_field(&mut self, key: &str) -> Option<Vec<DocumentNode>> {
        let removed = self.extension_fields.remove(key);
        self.refresh_projections();
        removed
    }

    /// Replace all group memberships with non-deleted references to the
    /// given hrefs.
    pub fn update_groups<I, S>(&mut self, group_links: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extension_fields.remove(GROUP_FIELD);
        let nodes: Vec<DocumentNode> = group_links
            .into_iter()
            .map(|href| {
                DocumentNode::Fragment(
                    [
                        ("@deleted", DocumentNode::text("false")),
                        ("@href", DocumentNode::text(href.into())),
                    ]
                    .into_iter()
                    .collect(),
                )
            })
            .collect();
        if !nodes.is_empty() {
            self.extension_fields.set(GROUP_FIELD, nodes);
        }
        self.refresh_projections();
    }

    /// Derive every typed projection from the current extension fields.
    fn refresh_projections(&mut self) {
        self.addresses = extract_addresses(self.ext(ADDRESS_FIELD));
        self.emails = extract_emails(self.ext(EMAIL_FIELD));
        let buckets = extract_phones(self.ext(PHONE_FIELD));
        self.phones = buckets.phones;
        self.mobiles = buckets.mobiles;
        self.fax_numbers = buckets.fax_numbers;
        self.websites = extract_websites(self.ext(WEBSITE_FIELD));
        self.organization = extract_organization(self.ext(ORGANIZATION_FIELD));
        self.birthday = extract_birthday(self.ext(BIRTHDAY_FIELD));

        let (groups, forces_delete) = extract_groups(self.ext(GROUP_FIELD));
        self.groups = groups;
        if forces_delete {
            self.intent = Some(Intent::Delete);
            self.delete_forced = true;
        }
    }

    fn ext(&self, key: &str) -> &[DocumentNode] {
        self.extension_fields.get(key).unwrap_or(&[])
    }
}

fn field_text(document: &Fragment, key: &str) -> Option<String> {
    document
        .get(key)
        .and_then(DocumentNode::text_value)
        .map(str::to_owned)
}

/// Strip the scheme prefix off a category term: everything after the first
/// `#`, or the whole term when no scheme is present.
fn category_label(term: &str) -> String {
    term.split_once('#')
        .map(|(_, label)| label)
        .unwrap_or(term)
        .to_owned()
}
