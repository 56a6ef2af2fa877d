//! Response writer and content negotiation.
//!
//! [`write`] turns a handler's [`Outcome`] and [`Reply`] into a finished
//! response. One call moves through four stages, each exactly once:
//!
//! 1. **status**: a zero code becomes `200`; a Surrogate-Control directive
//!    is guaranteed.
//! 2. **error body** (non-200 only): the error-style marker picks a plain
//!    text message or a canned HTML page, and the status→directive table
//!    overrides whatever directive the caller set.
//! 3. **headers**: the marker is stripped, a missing content type is
//!    sniffed, and `Vary: Accept-Encoding` is appended.
//! 4. **body**: gzip when the client accepts it and the body is large and
//!    compressible; otherwise the buffer goes out untouched.
//!
//! Writing bytes to the socket is the transport's job; see
//! [`Server`](crate::Server).

use std::io::Write as _;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, VARY};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::{debug, error, warn};

use crate::outcome::Outcome;
use crate::policy;
use crate::reply::{ERROR_STYLE_HEADER, ErrorStyle, Reply};
use crate::request::Request;
use crate::sniff;

pub const SURROGATE_CONTROL: HeaderName = HeaderName::from_static("surrogate-control");

/// Runs `handler` with a fresh [`Reply`] and writes its outcome.
///
/// The reply starts with `Vary: Accept` and the short Surrogate-Control
/// directive; handlers may overwrite either.
pub fn respond<F>(req: &Request, handler: F) -> http::Response<Bytes>
where
    F: FnOnce(&Request, &mut Reply) -> Outcome,
{
    let mut reply = Reply::new();
    reply.headers.insert(VARY, HeaderValue::from_static("Accept"));
    reply.headers.insert(SURROGATE_CONTROL, HeaderValue::from_static(policy::SHORT));

    let outcome = handler(req, &mut reply);
    write(reply, req, outcome)
}

/// Writes `outcome` and the buffer held by `reply` as a complete response.
///
/// A `None` buffer produces a headers-only response. For non-200 outcomes a
/// present buffer is always replaced by the error body.
pub fn write(reply: Reply, req: &Request, outcome: Outcome) -> http::Response<Bytes> {
    let style = reply.error_style();
    let Reply { mut headers, mut body, .. } = reply;

    let code = resolve_status(&mut headers, outcome.code);

    if code != StatusCode::OK.as_u16() {
        resolve_error_body(&mut headers, body.as_mut(), style, code, &outcome.msg);
    }

    headers.remove(ERROR_STYLE_HEADER);

    let has_content_type = headers
        .get(CONTENT_TYPE)
        .is_some_and(|v| !v.as_bytes().is_empty());
    if !has_content_type {
        let sniffed = sniff::content_type(body.as_deref().unwrap_or_default());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(sniffed));
    }
    headers.append(VARY, HeaderValue::from_static("Accept-Encoding"));

    let status = StatusCode::from_u16(code).unwrap_or_else(|_| {
        error!(code, "outcome carries an invalid status code, serving 500");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let body = match body {
        Some(buf) if should_compress(req, &headers, &buf) => match gzip(&buf) {
            Ok(compressed) => {
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                Bytes::from(compressed)
            }
            Err(e) => {
                error!("gzip failed, sending identity body: {e}");
                Bytes::from(buf)
            }
        },
        Some(buf) => Bytes::from(buf),
        None => Bytes::new(),
    };

    debug!(%status, len = body.len(), encoded = headers.contains_key(CONTENT_ENCODING), "response written");

    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn resolve_status(headers: &mut HeaderMap, code: u16) -> u16 {
    let code = if code == 0 {
        warn!("received Outcome with code 0, serving 200");
        StatusCode::OK.as_u16()
    } else {
        code
    };

    headers
        .entry(SURROGATE_CONTROL)
        .or_insert(HeaderValue::from_static(policy::SHORT));

    code
}

fn resolve_error_body(
    headers: &mut HeaderMap,
    body: Option<&mut Vec<u8>>,
    style: Option<ErrorStyle>,
    code: u16,
    msg: &str,
) {
    let (content_type, replacement) = match style {
        Some(ErrorStyle::Page) => (policy::HTML_CONTENT, policy::error_page(code)),
        Some(ErrorStyle::Message) => (policy::TEXT_CONTENT, msg),
        None => {
            warn!(code, "unrecognised error-style marker, leaving body as is");
            ("", "")
        }
    };

    if !content_type.is_empty() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        if let Some(buf) = body {
            buf.clear();
            buf.extend_from_slice(replacement.as_bytes());
        }
    }

    headers.insert(
        SURROGATE_CONTROL,
        HeaderValue::from_static(policy::surrogate_control(code)),
    );
}

fn should_compress(req: &Request, headers: &HeaderMap, body: &[u8]) -> bool {
    let accepts_gzip = req
        .headers()
        .get_all(ACCEPT_ENCODING)
        .iter()
        .any(|v| v.to_str().is_ok_and(|s| s.contains("gzip")));

    accepts_gzip
        && body.len() > policy::MIN_COMPRESS_LEN
        && headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(policy::is_compressible)
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
