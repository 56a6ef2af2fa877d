//! The value every handler returns.
//!
//! An [`Outcome`] says whether the handler succeeded, which status code goes
//! back to the client, and a message. For errors the message becomes the
//! response body (see [`ErrorStyle`](crate::ErrorStyle)).

use std::borrow::Cow;
use std::fmt;

use http::StatusCode;

/// Result of handling one request.
///
/// `Outcome::default()` is the zero value: `code == 0`. The writer treats a
/// zero code as `200 OK` and logs a warning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// `true` when the request was served successfully.
    pub ok: bool,
    /// HTTP status code written back to the client.
    pub code: u16,
    /// Message for logging or for the client.
    pub msg: Cow<'static, str>,
}

impl Outcome {
    pub const OK: Outcome = Outcome::fixed(true, StatusCode::OK, "");
    pub const METHOD_NOT_ALLOWED: Outcome =
        Outcome::fixed(false, StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    pub const NOT_FOUND: Outcome = Outcome::fixed(false, StatusCode::NOT_FOUND, "not found");
    pub const NOT_ACCEPTABLE: Outcome =
        Outcome::fixed(false, StatusCode::NOT_ACCEPTABLE, "specify accept");

    const fn fixed(ok: bool, status: StatusCode, msg: &'static str) -> Self {
        Self { ok, code: status.as_u16(), msg: Cow::Borrowed(msg) }
    }

    /// A failed outcome with an arbitrary status.
    pub fn error(status: StatusCode, msg: impl Into<Cow<'static, str>>) -> Self {
        Self { ok: false, code: status.as_u16(), msg: msg.into() }
    }

    /// `400 Bad Request` with `msg` for the client.
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, msg)
    }

    /// `500 Internal Server Error` carrying the text of `err`.
    pub fn internal_server_error(err: impl fmt::Display) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }

    /// `503 Service Unavailable` carrying the text of `err`.
    pub fn service_unavailable(err: impl fmt::Display) -> Self {
        Self::error(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    }
}
