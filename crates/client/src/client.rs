//! Request orchestration against the contacts/groups feed endpoints.
//!
//! The client composes URLs, headers, and serialized bodies, hands them to
//! the [`Transport`] collaborator, and interprets responses through the
//! [`FeedParser`] collaborator and the entry mapping engine. Every call is
//! blocking and strictly sequential.

use gdata_document::{render_document, DocumentNode, Fragment};
use gdata_entry::{decode_batch, encode_batch, Entry};
use url::Url;

use crate::cursor::Paginator;
use crate::feed::Feed;
use crate::transport::{FeedParser, Method, Request, Transport, TransportResponse};
use crate::{ClientError, ClientResult};

/// Default service origin.
pub const DEFAULT_BASE_URL: &str = "https://www.google.com";

const XML_PROLOG: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";
const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Which resource kind the client's default endpoints address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedKind {
    #[default]
    Contacts,
    Groups,
}

impl FeedKind {
    fn path_segment(self) -> &'static str {
        match self {
            FeedKind::Contacts => "contacts",
            FeedKind::Groups => "groups",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: Url,
    pub kind: FeedKind,
}

impl ClientOptions {
    pub fn new(kind: FeedKind) -> Self {
        ClientOptions {
            kind,
            ..Self::default()
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            // Literal constant, cannot fail to parse.
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            kind: FeedKind::Contacts,
        }
    }
}

/// Feed service client over a pluggable transport and tree-builder.
pub struct Client<T: Transport, P: FeedParser> {
    transport: T,
    parser: P,
    options: ClientOptions,
}

impl<T: Transport, P: FeedParser> Client<T, P> {
    pub fn new(transport: T, parser: P) -> Self {
        Self::with_options(transport, parser, ClientOptions::default())
    }

    pub fn with_options(transport: T, parser: P, options: ClientOptions) -> Self {
        Client {
            transport,
            parser,
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Fetch one listing page.
    pub fn all(&mut self, params: &[(&str, &str)]) -> ClientResult<Feed> {
        let url = self.feed_url(None, params);
        self.fetch_feed(url)
    }

    /// Fresh pagination cursor over the full listing, starting from the
    /// first page. Each call starts over from the initial URI.
    pub fn paginate_all(&mut self) -> Paginator<'_, T, P> {
        let start = self.feed_url(None, &[]);
        Paginator::new(self, start)
    }

    /// Fetch a single entry by its short id.
    pub fn get(&mut self, short_id: &str, params: &[(&str, &str)]) -> ClientResult<Entry> {
        let url = self.feed_url(Some(short_id), params);
        let response = self.request_ok(Request::new(Method::Get, url))?;
        let document = self.parse_root(&response.body, "entry")?;
        Ok(Entry::from_document(&document))
    }

    /// Create an entry; returns the service's view of the created record.
    pub fn create(&mut self, entry: &Entry) -> ClientResult<Entry> {
        let url = self.feed_url(None, &[]);
        let request = Request::new(Method::Post, url)
            .header("Content-Type", ATOM_CONTENT_TYPE)
            .body(with_prolog(&entry.to_xml(false)));
        let response = self.request_ok(request)?;
        let document = self.parse_root(&response.body, "entry")?;
        Ok(Entry::from_document(&document))
    }

    /// Update an existing entry in place; requires an id.
    pub fn update(&mut self, entry: &Entry) -> ClientResult<Entry> {
        let short_id = short_id(entry)?;
        let url = self.feed_url(Some(short_id), &[]);
        let mut request = Request::new(Method::Put, url)
            .header("Content-Type", ATOM_CONTENT_TYPE)
            .body(with_prolog(&entry.to_xml(false)));
        if let Some(etag) = entry.etag() {
            request = request.header("If-Match", etag);
        }
        let response = self.request_ok(request)?;
        let document = self.parse_root(&response.body, "entry")?;
        Ok(Entry::from_document(&document))
    }

    /// Delete an existing entry; requires an id.
    pub fn delete(&mut self, entry: &Entry) -> ClientResult<()> {
        let short_id = short_id(entry)?;
        let url = self.feed_url(Some(short_id), &[]);
        let mut request = Request::new(Method::Delete, url);
        if let Some(etag) = entry.etag() {
            request = request.header("If-Match", etag);
        }
        self.request_ok(request)?;
        Ok(())
    }

    /// Submit a batch of intent-flagged entries in one round trip.
    ///
    /// Results come back in submission order, one per submitted entry, each
    /// carrying its own batch outcome; a count mismatch is surfaced as a
    /// data-integrity error rather than silently reordered.
    pub fn batch(&mut self, entries: &[Entry]) -> ClientResult<Vec<Entry>> {
        let url = self.feed_url(Some("batch"), &[]);
        let body = with_prolog(&render_document("feed", &encode_batch(entries)));
        let request = Request::new(Method::Post, url)
            .header("Content-Type", ATOM_CONTENT_TYPE)
            .body(body);
        let response = self.request_ok(request)?;
        let document = self.parse_root(&response.body, "feed")?;
        let results = decode_batch(&document);
        if results.len() != entries.len() {
            return Err(ClientError::BatchMismatch {
                sent: entries.len(),
                received: results.len(),
            });
        }
        Ok(results)
    }

    /// Replace the entry's photo with raw media bytes.
    pub fn update_photo(
        &mut self,
        entry: &Entry,
        bytes: &[u8],
        content_type: &str,
    ) -> ClientResult<()> {
        let short_id = short_id(entry)?;
        let mut url = self.options.base_url.clone();
        url.set_path(&format!("/m8/feeds/photos/media/default/{short_id}"));
        let request = Request::new(Method::Put, url)
            .header("Content-Type", content_type)
            .header("If-Match", "*")
            .body(bytes.to_vec());
        self.request_ok(request)?;
        Ok(())
    }

    /// Fetch and parse one feed page from an absolute URL.
    pub(crate) fn fetch_feed(&mut self, url: Url) -> ClientResult<Feed> {
        let response = self.request_ok(Request::new(Method::Get, url))?;
        let document = self.parse_root(&response.body, "feed")?;
        Ok(Feed::from_document(&document))
    }

    fn feed_url(&self, suffix: Option<&str>, params: &[(&str, &str)]) -> Url {
        let mut url = self.options.base_url.clone();
        let mut path = format!("/m8/feeds/{}/default/full", self.options.kind.path_segment());
        if let Some(suffix) = suffix {
            path.push('/');
            path.push_str(suffix);
        }
        url.set_path(&path);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }

    fn request_ok(&mut self, request: Request) -> ClientResult<TransportResponse> {
        tracing::debug!(method = ?request.method, url = %request.url, "issuing feed request");
        let response = self.transport.execute(request)?;
        if !response.is_success() {
            return Err(ClientError::from_response(response));
        }
        Ok(response)
    }

    fn parse_root(&mut self, body: &str, key: &'static str) -> ClientResult<Fragment> {
        let document = self.parser.parse(body)?;
        document
            .as_fragment()
            .and_then(|root| root.get(key))
            .and_then(DocumentNode::as_fragment)
            .cloned()
            .ok_or(ClientError::MissingRoot(key))
    }
}

fn short_id(entry: &Entry) -> ClientResult<&str> {
    let id = entry.id().ok_or(ClientError::MissingId)?;
    Ok(id.rsplit('/').next().unwrap_or(id))
}

fn with_prolog(xml: &str) -> Vec<u8> {
    let mut body = String::with_capacity(XML_PROLOG.len() + xml.len());
    body.push_str(XML_PROLOG);
    body.push_str(xml);
    body.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    // ------------------------------------------------------------------
    // Scripted collaborators
    // ------------------------------------------------------------------

    struct Expectation {
        method: Method,
        url: &'static str,
        require_headers: Vec<(&'static str, &'static str)>,
        body_contains: Vec<&'static str>,
        response: TransportResponse,
    }

    impl Expectation {
        fn new(method: Method, url: &'static str, status: u16) -> Self {
            Expectation {
                method,
                url,
                require_headers: Vec::new(),
                body_contains: Vec::new(),
                response: TransportResponse::new(status, "body"),
            }
        }

        fn header(mut self, name: &'static str, value: &'static str) -> Self {
            self.require_headers.push((name, value));
            self
        }

        fn body_contains(mut self, needle: &'static str) -> Self {
            self.body_contains.push(needle);
            self
        }
    }

    struct ScriptedTransport {
        expectations: VecDeque<Expectation>,
    }

    impl ScriptedTransport {
        fn new(expectations: Vec<Expectation>) -> Self {
            ScriptedTransport {
                expectations: expectations.into(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&mut self, request: Request) -> ClientResult<TransportResponse> {
            let expected = self.expectations.pop_front().expect("unexpected request");
            assert_eq!(request.method, expected.method);
            assert_eq!(request.url.as_str(), expected.url);
            for (name, value) in &expected.require_headers {
                assert!(
                    request
                        .headers
                        .iter()
                        .any(|(header, header_value)| header == name && header_value == value),
                    "missing header {name}: {value}"
                );
            }
            if !expected.body_contains.is_empty() {
                let body = request.body.expect("request should carry a body");
                let body = String::from_utf8(body).expect("utf-8 body");
                for needle in &expected.body_contains {
                    assert!(body.contains(needle), "body missing {needle:?}: {body}");
                }
            }
            Ok(expected.response)
        }
    }

    struct StubParser {
        documents: VecDeque<DocumentNode>,
    }

    impl StubParser {
        fn new(documents: Vec<DocumentNode>) -> Self {
            StubParser {
                documents: documents.into(),
            }
        }
    }

    impl FeedParser for StubParser {
        fn parse(&mut self, _body: &str) -> ClientResult<DocumentNode> {
            Ok(self.documents.pop_front().expect("unexpected parse call"))
        }
    }

    // ------------------------------------------------------------------
    // Document builders
    // ------------------------------------------------------------------

    fn attr_map(pairs: &[(&str, &str)]) -> DocumentNode {
        DocumentNode::Fragment(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), DocumentNode::text(*value)))
                .collect(),
        )
    }

    fn entry_fragment(title: &str, id: &str) -> DocumentNode {
        let mut entry = Fragment::new();
        entry.set("id", DocumentNode::text(id));
        entry.set("title", DocumentNode::text(title));
        DocumentNode::Fragment(entry)
    }

    fn wrap_root(key: &str, inner: DocumentNode) -> DocumentNode {
        let mut root = Fragment::new();
        root.set(key, inner);
        DocumentNode::Fragment(root)
    }

    fn feed_doc(entries: Vec<DocumentNode>, next_uri: Option<&str>) -> DocumentNode {
        let mut feed = Fragment::new();
        feed.set("title", DocumentNode::text("Johnny's Contacts"));
        if let Some(next_uri) = next_uri {
            feed.set(
                "link",
                attr_map(&[("@rel", "next"), ("@href", next_uri)]),
            );
        }
        feed.set("entry", DocumentNode::List(entries));
        wrap_root("feed", DocumentNode::Fragment(feed))
    }

    fn parsed_entry(id: &str, etag: &str) -> Entry {
        let mut document = Fragment::new();
        document.set("id", DocumentNode::text(id));
        document.set("@gd:etag", DocumentNode::text(etag));
        document.set("title", DocumentNode::text("Casey"));
        Entry::from_document(&document)
    }

    // ------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------

    #[test]
    fn all_lists_the_contacts_feed() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Get,
            "https://www.google.com/m8/feeds/contacts/default/full?updated-min=1234",
            200,
        )]);
        let parser = StubParser::new(vec![feed_doc(
            vec![entry_fragment("Steve Stephson", "http://example.com/full/a")],
            None,
        )]);

        let mut client = Client::new(transport, parser);
        let feed = client.all(&[("updated-min", "1234")]).expect("feed");
        assert_eq!(feed.title.as_deref(), Some("Johnny's Contacts"));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries[0].title(), Some("Steve Stephson"));
    }

    #[test]
    fn groups_kind_addresses_the_groups_feed() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Get,
            "https://www.google.com/m8/feeds/groups/default/full",
            200,
        )]);
        let parser = StubParser::new(vec![feed_doc(vec![], None)]);

        let mut client =
            Client::with_options(transport, parser, ClientOptions::new(FeedKind::Groups));
        let feed = client.all(&[]).expect("feed");
        assert!(feed.is_empty());
    }

    #[test]
    fn get_fetches_a_single_entry() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Get,
            "https://www.google.com/m8/feeds/contacts/default/full/908f380f4c2f81?a=1",
            200,
        )]);
        let parser = StubParser::new(vec![wrap_root(
            "entry",
            entry_fragment("Casey", "http://example.com/base/3a203c8da7ac0a8"),
        )]);

        let mut client = Client::new(transport, parser);
        let entry = client.get("908f380f4c2f81", &[("a", "1")]).expect("entry");
        assert_eq!(entry.title(), Some("Casey"));
    }

    #[test]
    fn create_posts_the_serialized_entry() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Post,
            "https://www.google.com/m8/feeds/contacts/default/full",
            201,
        )
        .header("Content-Type", "application/atom+xml")
        .body_contains("<?xml version='1.0' encoding='UTF-8'?>")
        .body_contains("<atom:title>Foo Bar</atom:title>")]);
        let parser = StubParser::new(vec![wrap_root(
            "entry",
            entry_fragment("Foo Bar", "http://example.com/base/32c39d7106a538e"),
        )]);

        let mut entry = Entry::new();
        entry.set_category("contact");
        entry.set_title("Foo Bar");

        let mut client = Client::new(transport, parser);
        let created = client.create(&entry).expect("created entry");
        assert_eq!(created.title(), Some("Foo Bar"));
        assert_eq!(created.id(), Some("http://example.com/base/32c39d7106a538e"));
    }

    #[test]
    fn update_puts_with_if_match() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Put,
            "https://www.google.com/m8/feeds/contacts/default/full/32c39d7106a538e",
            200,
        )
        .header("If-Match", "\"etag.\"")
        .body_contains("/full/32c39d7106a538e</id>")]);
        let parser = StubParser::new(vec![wrap_root(
            "entry",
            entry_fragment("Casey", "http://example.com/base/32c39d7106a538e"),
        )]);

        let entry = parsed_entry("http://example.com/base/32c39d7106a538e", "\"etag.\"");
        let mut client = Client::new(transport, parser);
        let updated = client.update(&entry).expect("updated entry");
        assert_eq!(updated.title(), Some("Casey"));
    }

    #[test]
    fn delete_issues_a_delete_with_if_match() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Delete,
            "https://www.google.com/m8/feeds/contacts/default/full/3f93e3738e811d63",
            200,
        )
        .header("If-Match", "\"etag.\"")]);
        let parser = StubParser::new(vec![]);

        let entry = parsed_entry("http://example.com/base/3f93e3738e811d63", "\"etag.\"");
        let mut client = Client::new(transport, parser);
        client.delete(&entry).expect("delete");
    }

    #[test]
    fn mutating_without_an_id_is_rejected() {
        let mut client = Client::new(ScriptedTransport::new(vec![]), StubParser::new(vec![]));
        let entry = Entry::new();
        assert!(matches!(client.update(&entry), Err(ClientError::MissingId)));
        assert!(matches!(client.delete(&entry), Err(ClientError::MissingId)));
    }

    #[test]
    fn unauthorized_surfaces_as_a_transport_error() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Get,
            "https://www.google.com/m8/feeds/contacts/default/full",
            401,
        )]);
        let mut client = Client::new(transport, StubParser::new(vec![]));

        match client.all(&[]) {
            Err(ClientError::Transport { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn batch_round_trip_reports_per_item_results() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Post,
            "https://www.google.com/m8/feeds/contacts/default/full/batch",
            200,
        )
        .body_contains("<batch:id>create</batch:id>")
        .body_contains("<batch:operation type='insert'/>")
        .body_contains("xmlns:batch='http://schemas.google.com/gdata/batch'")]);

        let mut result_entry = Fragment::new();
        result_entry.set("batch:id", DocumentNode::text("create"));
        result_entry.set(
            "batch:status",
            attr_map(&[("@code", "201"), ("@reason", "Created")]),
        );
        result_entry.set("batch:operation", attr_map(&[("@type", "insert")]));
        result_entry.set("title", DocumentNode::text("Foo Bar"));
        let parser = StubParser::new(vec![feed_doc(
            vec![DocumentNode::Fragment(result_entry)],
            None,
        )]);

        let mut entry = Entry::new();
        entry.set_category("contact");
        entry.set_title("Foo Bar");
        entry.set_extension_field(
            "gd:name",
            vec![DocumentNode::Fragment(
                [("gd:givenName", DocumentNode::text("Foo Bar"))]
                    .into_iter()
                    .collect(),
            )],
        );
        entry.create();

        let mut client = Client::new(transport, parser);
        let results = client.batch(&[entry]).expect("batch results");
        assert_eq!(results.len(), 1);
        let outcome = results[0].batch_result().expect("batch result");
        assert_eq!(outcome.status.as_deref(), Some("create"));
        assert_eq!(outcome.code.as_deref(), Some("201"));
        assert_eq!(outcome.reason.as_deref(), Some("Created"));
        assert_eq!(outcome.operation.as_deref(), Some("insert"));
        assert!(outcome.is_success());
    }

    #[test]
    fn batch_count_mismatch_is_a_data_integrity_error() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Post,
            "https://www.google.com/m8/feeds/contacts/default/full/batch",
            200,
        )]);
        let parser = StubParser::new(vec![feed_doc(vec![], None)]);

        let mut entry = Entry::new();
        entry.set_category("contact");
        entry.create();

        let mut client = Client::new(transport, parser);
        match client.batch(&[entry]) {
            Err(ClientError::BatchMismatch { sent, received }) => {
                assert_eq!(sent, 1);
                assert_eq!(received, 0);
            }
            other => panic!("expected batch mismatch, got {other:?}"),
        }
    }

    #[test]
    fn paginate_all_follows_next_links_until_done() {
        let transport = ScriptedTransport::new(vec![
            Expectation::new(
                Method::Get,
                "https://www.google.com/m8/feeds/contacts/default/full",
                200,
            ),
            Expectation::new(
                Method::Get,
                "https://www.google.com/m8/feeds/contacts/u/full?start-index=3&max-results=2",
                200,
            ),
            Expectation::new(
                Method::Get,
                "https://www.google.com/m8/feeds/contacts/u/full?start-index=5&max-results=2",
                200,
            ),
        ]);
        let parser = StubParser::new(vec![
            feed_doc(
                vec![
                    entry_fragment("Jack 1", "http://example.com/full/1"),
                    entry_fragment("Jack 2", "http://example.com/full/2"),
                ],
                Some("https://www.google.com/m8/feeds/contacts/u/full?start-index=3&max-results=2"),
            ),
            feed_doc(
                vec![
                    entry_fragment("Jack 3", "http://example.com/full/3"),
                    entry_fragment("Jack 4", "http://example.com/full/4"),
                ],
                Some("https://www.google.com/m8/feeds/contacts/u/full?start-index=5&max-results=2"),
            ),
            feed_doc(vec![entry_fragment("Jack 5", "http://example.com/full/5")], None),
        ]);

        let mut client = Client::new(transport, parser);
        let mut titles = Vec::new();
        let mut pages = client.paginate_all();
        while let Some(feed) = pages.next_page().expect("page") {
            for entry in &feed.entries {
                titles.push(entry.title().unwrap_or_default().to_owned());
            }
        }

        assert_eq!(titles, ["Jack 1", "Jack 2", "Jack 3", "Jack 4", "Jack 5"]);
    }

    #[test]
    fn update_photo_puts_media_bytes() {
        let transport = ScriptedTransport::new(vec![Expectation::new(
            Method::Put,
            "https://www.google.com/m8/feeds/photos/media/default/fd8fb1a55f2916e",
            200,
        )
        .header("Content-Type", "image/jpeg")
        .header("If-Match", "*")]);
        let parser = StubParser::new(vec![]);

        let entry = parsed_entry("http://example.com/base/fd8fb1a55f2916e", "\"etag.\"");
        let mut client = Client::new(transport, parser);
        client
            .update_photo(&entry, &[0xff, 0xd8, 0xff], "image/jpeg")
            .expect("photo update");
    }
}
