//! Blocking client for the contacts/groups feed protocol.
//!
//! The crate wires a pluggable byte transport and XML tree-builder to the
//! [`gdata_entry`] mapping engine. It owns URL construction, conditional
//! headers, batch submission, and `next`-link pagination; the actual HTTP
//! stack and XML tokenizer are supplied by the caller through the
//! [`Transport`] and [`FeedParser`] traits.

pub mod client;
pub mod cursor;
pub mod feed;
pub mod transport;

pub use client::{Client, ClientOptions, FeedKind, DEFAULT_BASE_URL};
pub use cursor::Paginator;
pub use feed::Feed;
pub use transport::{FeedParser, Method, Request, Transport, TransportResponse};

use thiserror::Error;

/// Failures surfaced by feed operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("feed request failed with status {status}")]
    Transport { status: u16, body: String },

    /// The transport could not complete the exchange at all.
    #[error("transport error: {0}")]
    Io(String),

    /// The response body could not be built into a document tree.
    #[error("unparseable feed response: {0}")]
    Parse(String),

    /// The parsed response is missing the expected root element.
    #[error("response is missing its <{0}> root")]
    MissingRoot(&'static str),

    /// The operation needs an entry that has already been assigned an id.
    #[error("entry has no id")]
    MissingId,

    /// A URL taken from a feed link could not be parsed.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A batch response did not carry one result per submitted entry.
    #[error("batch reply carried {received} results for {sent} submitted entries")]
    BatchMismatch { sent: usize, received: usize },
}

pub type ClientResult<T> = Result<T, ClientError>;
