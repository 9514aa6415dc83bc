//! Lazy page-by-page traversal of a feed listing.

use url::Url;

use crate::client::Client;
use crate::feed::Feed;
use crate::transport::{FeedParser, Transport};
use crate::ClientResult;

/// Cursor over a paginated listing, driven by the service's `next` links.
///
/// Pages are fetched on demand; nothing beyond the current position is
/// retained, so a cursor can be abandoned at any point without cleanup.
pub struct Paginator<'a, T: Transport, P: FeedParser> {
    client: &'a mut Client<T, P>,
    next: Option<Url>,
}

impl<'a, T: Transport, P: FeedParser> Paginator<'a, T, P> {
    pub(crate) fn new(client: &'a mut Client<T, P>, start: Url) -> Self {
        Paginator {
            client,
            next: Some(start),
        }
    }

    /// Fetch the next page, or `Ok(None)` once the listing is exhausted.
    ///
    /// A page without a `next` link is the last one. After an error the
    /// cursor is spent and further calls return `Ok(None)`.
    pub fn next_page(&mut self) -> ClientResult<Option<Feed>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        let feed = self.client.fetch_feed(url)?;
        if let Some(next_uri) = &feed.next_uri {
            self.next = Some(Url::parse(next_uri)?);
        }
        Ok(Some(feed))
    }
}

impl<T: Transport, P: FeedParser> Iterator for Paginator<'_, T, P> {
    type Item = ClientResult<Feed>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}
