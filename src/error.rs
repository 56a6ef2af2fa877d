//! Error types.
//!
//! Request-level failures (400, 404, 406, …) are [`Outcome`](crate::Outcome)
//! values rendered by the writer, never `Error`s. These types cover the two
//! things that can actually fail: validating an API description, and the
//! transport.

use thiserror::Error;

/// An invalid API description. Nothing is registered when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("found empty URI")]
    EmptyUri,

    #[error("found no requests (GET, PUT, DELETE) for {0}")]
    NoRequests(String),

    #[error("found duplicate URI {0}")]
    DuplicateUri(String),

    #[error("URIs {first} and {second} both map to dispatch name {name}")]
    DuplicateName { first: String, second: String, name: String },

    #[error("found invalid Accept value {accept:?} for {uri} GET")]
    InvalidAccept { uri: String, accept: String },

    #[error("found duplicate Accept value {accept:?} for {uri} GET")]
    DuplicateAccept { uri: String, accept: String },

    #[error("found multiple defaults for {0} GET")]
    MultipleDefaults(String),
}

/// Transport failures from [`Server`](crate::Server).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bind address {addr:?}: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
