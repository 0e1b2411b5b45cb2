//! The response sink handed to every step, and the response it turns into.
//!
//! Middleware and handlers never return a response. They write into a
//! [`ResponseWriter`]; once the chain finishes (or halts) the writer becomes a
//! [`Response`] and is handed back to hyper.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::bytes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Mutable response sink threaded through a chain.
///
/// Starts as `200 OK` with no headers and an empty body. Every step may set
/// the status, add headers, or write body bytes; a step that halts the chain
/// is expected to have written its error response first.
///
/// ```rust
/// use chainware::{ContentType, ResponseWriter};
/// use http::StatusCode;
///
/// let mut w = ResponseWriter::new();
/// w.set_status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// assert_eq!(w.status(), StatusCode::CREATED);
///
/// let mut w = ResponseWriter::new();
/// w.bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    written: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Vec::new(),
            written: false,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self.written = true;
        self
    }

    /// Appends a header. Repeated names are all sent, in insertion order.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self.written = true;
        self
    }

    /// Appends raw bytes to the body.
    pub fn write(&mut self, chunk: &[u8]) -> &mut Self {
        self.body.extend_from_slice(chunk);
        self.written = true;
        self
    }

    /// Replaces the body with JSON bytes (`application/json`).
    pub fn json(&mut self, body: Vec<u8>) -> &mut Self {
        self.bytes(ContentType::Json, body)
    }

    /// Replaces the body with plain text (`text/plain; charset=utf-8`).
    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.bytes(ContentType::Text, body.into().into_bytes())
    }

    /// Replaces the body and sets (not appends) `content-type`.
    pub fn bytes(&mut self, content_type: ContentType, body: Vec<u8>) -> &mut Self {
        self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
        self.headers.push(("content-type".to_owned(), content_type.as_str().to_owned()));
        self.body = body;
        self.written = true;
        self
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Whether any step touched the writer.
    pub fn is_written(&self) -> bool { self.written }

    /// Case-insensitive lookup of the first header named `name`.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn into_response(self) -> Response {
        Response { status: self.status, headers: self.headers, body: self.body }
    }
}

impl Default for ResponseWriter {
    fn default() -> Self { Self::new() }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A finished response, ready to hand to hyper.
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    /// A bodiless response, used by the host adapter when a request never
    /// reaches the chain.
    pub(crate) fn status(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    /// Converts into the hyper response type.
    ///
    /// Headers whose name or value is not valid HTTP are dropped (and logged)
    /// rather than failing the whole response.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_writer_is_an_empty_ok() {
        let w = ResponseWriter::new();
        assert!(!w.is_written());
        assert_eq!(w.status(), StatusCode::OK);
        assert!(w.body().is_empty());
    }

    #[test]
    fn typed_body_replaces_content_type() {
        let mut w = ResponseWriter::new();
        w.text("hello").json(b"{}".to_vec());

        let content_types: Vec<_> = w.headers().iter()
            .filter(|(k, _)| k == "content-type")
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(w.get_header("Content-Type"), Some("application/json"));
        assert_eq!(w.body(), b"{}");
    }

    #[test]
    fn write_appends() {
        let mut w = ResponseWriter::new();
        w.write(b"ab").write(b"cd");
        assert_eq!(w.body(), b"abcd");
        assert!(w.is_written());
    }

    #[test]
    fn into_inner_keeps_repeated_headers_and_drops_invalid_ones() {
        let mut w = ResponseWriter::new();
        w.set_status(StatusCode::FORBIDDEN)
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .header("bad header", "x");

        let res = w.into_response().into_inner();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
        assert_eq!(res.headers().len(), 2);
    }
}
