//! Exact-URI routing table.
//!
//! No patterns and no prefix matching: a request path either equals a
//! registered URI byte for byte or it is a 404. Build the router once at
//! startup and hand it to [`Server::serve`](crate::Server::serve).

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::api::Api;
use crate::compile::{Dispatch, Registration};
use crate::error::SpecError;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::writer;

#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<String, Arc<Dispatch>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `api` and registers each endpoint. Fails without registering
    /// anything if the API is invalid or reuses an already mounted URI.
    pub fn mount(mut self, api: &Api) -> Result<Self, SpecError> {
        let registrations = api.compile()?;

        if let Some(r) = registrations.iter().find(|r| self.routes.contains_key(&r.uri)) {
            return Err(SpecError::DuplicateUri(r.uri.clone()));
        }

        for r in registrations {
            self.register(r);
        }
        Ok(self)
    }

    fn register(&mut self, r: Registration) {
        debug!(uri = %r.uri, name = %r.name, "registered");
        self.routes.insert(r.uri, r.dispatch);
    }

    pub fn lookup(&self, path: &str) -> Option<&Arc<Dispatch>> {
        self.routes.get(path)
    }

    /// Dispatches `req` and writes the response. Unknown paths get `404`.
    pub fn respond(&self, req: &Request) -> http::Response<Bytes> {
        match self.lookup(req.path()) {
            Some(dispatch) => writer::respond(req, |req, reply| dispatch.call(req, reply)),
            None => writer::respond(req, |_, _| Outcome::NOT_FOUND),
        }
    }
}
