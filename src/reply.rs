//! Per-request output context handed to handlers.

use std::str::FromStr;

use http::{HeaderMap, HeaderName};

/// Legacy out-of-band marker. Honoured when [`Reply::error_style`] was never
/// set, and always removed before the response leaves the process.
pub const ERROR_STYLE_HEADER: HeaderName = HeaderName::from_static("weft-error");

/// How the writer renders the body of a non-200 response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStyle {
    /// `text/plain` body holding the outcome's message.
    #[default]
    Message,
    /// `text/html` canned error page chosen by status code.
    Page,
}

impl FromStr for ErrorStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page"                 => Ok(Self::Page),
            "msg" | "message" | "" => Ok(Self::Message),
            _                      => Err(()),
        }
    }
}

/// Outgoing headers, the output buffer, and the error-style marker for one
/// request.
///
/// The buffer is `None` for a headers-only response. Handlers write through
/// [`Reply::body_mut`], which creates it on first use.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) error_style: Option<ErrorStyle>,
}

impl Reply {
    /// An empty reply with an empty (present) buffer.
    pub fn new() -> Self {
        Self { body: Some(Vec::new()), ..Self::default() }
    }

    /// A reply with no buffer at all: only headers are written.
    pub fn headers_only() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> Option<&[u8]> { self.body.as_deref() }

    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        self.body.get_or_insert_with(Vec::new)
    }

    /// Appends `bytes` to the buffer.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body_mut().extend_from_slice(bytes.as_ref());
    }

    pub fn set_error_style(&mut self, style: ErrorStyle) {
        self.error_style = Some(style);
    }

    /// The marker in effect: the typed field, else the legacy header, else
    /// [`ErrorStyle::Message`]. An unrecognised header value reads as
    /// `None`.
    pub fn error_style(&self) -> Option<ErrorStyle> {
        if let Some(style) = self.error_style {
            return Some(style);
        }
        match self.headers.get(&ERROR_STYLE_HEADER) {
            Some(v) => v.to_str().ok().and_then(|s| s.parse().ok()),
            None => Some(ErrorStyle::Message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn buffer_presence() {
        assert_eq!(Reply::new().body(), Some(&[][..]));
        assert_eq!(Reply::headers_only().body(), None);

        let mut reply = Reply::headers_only();
        reply.write("quake");
        assert_eq!(reply.body(), Some(&b"quake"[..]));
    }

    #[test]
    fn marker_defaults_to_message() {
        assert_eq!(Reply::new().error_style(), Some(ErrorStyle::Message));
    }

    #[test]
    fn typed_marker_beats_header() {
        let mut reply = Reply::new();
        reply.headers_mut().insert(ERROR_STYLE_HEADER, HeaderValue::from_static("msg"));
        reply.set_error_style(ErrorStyle::Page);
        assert_eq!(reply.error_style(), Some(ErrorStyle::Page));
    }

    #[test]
    fn header_marker() {
        let mut reply = Reply::new();
        reply.headers_mut().insert(ERROR_STYLE_HEADER, HeaderValue::from_static("page"));
        assert_eq!(reply.error_style(), Some(ErrorStyle::Page));

        reply.headers_mut().insert(ERROR_STYLE_HEADER, HeaderValue::from_static("banner"));
        assert_eq!(reply.error_style(), None);
    }
}
