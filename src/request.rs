//! Incoming request, as seen by middleware and handlers.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};
use http::request::Parts;

/// An incoming HTTP request with its body already collected.
///
/// Middleware and handlers only ever borrow it; the chain passes the same
/// request to every step unchanged.
#[derive(Debug)]
pub struct Request {
    head: Parts,
    body: Bytes,
}

impl Request {
    pub(crate) fn from_parts(head: Parts, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn version(&self) -> Version { self.head.version }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Extensions the host attached to the request (remote address, TLS info…).
    pub fn extensions(&self) -> &http::Extensions { &self.head.extensions }
}

/// Builds a request directly, for driving [`Chain::run`](crate::Chain::run)
/// without a server.
impl<B: Into<Bytes>> From<http::Request<B>> for Request {
    fn from(req: http::Request<B>) -> Self {
        let (head, body) = req.into_parts();
        Self::from_parts(head, body.into())
    }
}
