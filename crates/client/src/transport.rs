//! Collaborator traits for the HTTP transport and the XML tree-builder.
//!
//! This crate decides what to send and how to interpret what comes back;
//! sockets, TLS, and authorization headers belong to the [`Transport`]
//! implementation, and byte-stream-to-tree parsing belongs to the
//! [`FeedParser`] implementation.

use gdata_document::DocumentNode;
use url::Url;

use crate::{ClientError, ClientResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// One outgoing request. Bodies are raw bytes so photo media uploads share
/// the same path as XML documents.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Request {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Response as seen by the orchestration layer.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request/response exchange. One call per request, issued
/// strictly sequentially; retries are the caller's policy, never this
/// crate's.
pub trait Transport {
    fn execute(&mut self, request: Request) -> ClientResult<TransportResponse>;
}

/// External XML tree-builder turning a response body into the generic
/// document representation.
pub trait FeedParser {
    fn parse(&mut self, body: &str) -> ClientResult<DocumentNode>;
}

impl ClientError {
    /// Build the error value for a non-success response.
    pub(crate) fn from_response(response: TransportResponse) -> Self {
        ClientError::Transport {
            status: response.status,
            body: response.body,
        }
    }
}
