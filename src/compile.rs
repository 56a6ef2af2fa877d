//! Compiling an [`Api`] into dispatch tables.
//!
//! Compilation validates the whole description first and only then builds
//! anything, so an invalid API produces no registrations at all. Each
//! endpoint becomes a [`Dispatch`]: a method switch whose GET arm is a
//! switch on the request's `Accept` header. Every arm, the fallback
//! included, runs [`check_query`] with the variant's declared parameters
//! before calling its handler.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tracing::debug;

use crate::api::{Api, Variant};
use crate::error::SpecError;
use crate::handler::BoxedHandler;
use crate::outcome::Outcome;
use crate::query::check_query;
use crate::reply::Reply;
use crate::request::Request;

/// One exact URI bound to its compiled dispatch routine.
#[derive(Clone, Debug)]
pub struct Registration {
    pub uri: String,
    /// Dispatch identifier derived from the URI by [`handler_name`].
    pub name: String,
    pub dispatch: Arc<Dispatch>,
}

/// Maps a URI to its dispatch identifier: separators are dropped and a
/// trailing separator marks a collection, pluralised with `s`.
///
/// `/quake` → `quakeHandler`, `/quake/` → `quakesHandler`.
pub fn handler_name(uri: &str) -> String {
    let plural = if uri.ends_with('/') { "s" } else { "" };
    format!("{}{plural}Handler", uri.replace('/', ""))
}

impl Api {
    /// Validates the API and builds one [`Registration`] per endpoint, in
    /// declaration order. Returns the first violation found.
    pub fn compile(&self) -> Result<Vec<Registration>, SpecError> {
        self.validate()?;

        let mut registrations = Vec::with_capacity(self.endpoints.len());

        for e in &self.endpoints {
            let mut get = Vec::with_capacity(e.get.len());
            let mut fallback = None;

            for v in &e.get {
                let arm = Arm::new(v, &e.uri)?;
                if get.iter().any(|a: &Arm| a.accept == arm.accept) {
                    return Err(SpecError::DuplicateAccept {
                        uri: e.uri.clone(),
                        accept: v.accept.clone(),
                    });
                }
                if v.default {
                    if fallback.is_some() {
                        return Err(SpecError::MultipleDefaults(e.uri.clone()));
                    }
                    fallback = Some(get.len());
                }
                get.push(arm);
            }

            let name = handler_name(&e.uri);
            debug!(uri = %e.uri, %name, variants = get.len(), "compiled endpoint");

            registrations.push(Registration {
                uri: e.uri.clone(),
                dispatch: Arc::new(Dispatch {
                    name: name.clone(),
                    get,
                    fallback,
                    put: e.put.as_ref().map(|v| Arm::new(v, &e.uri)).transpose()?,
                    delete: e.delete.as_ref().map(|v| Arm::new(v, &e.uri)).transpose()?,
                }),
                name,
            });
        }

        Ok(registrations)
    }

    fn validate(&self) -> Result<(), SpecError> {
        let mut names: HashMap<String, &str> = HashMap::new();

        for e in &self.endpoints {
            if e.uri.is_empty() {
                return Err(SpecError::EmptyUri);
            }
            if !e.has_requests() {
                return Err(SpecError::NoRequests(e.uri.clone()));
            }
            if let Some(first) = names.insert(handler_name(&e.uri), &e.uri) {
                return Err(if first == e.uri {
                    SpecError::DuplicateUri(e.uri.clone())
                } else {
                    SpecError::DuplicateName {
                        first: first.to_owned(),
                        second: e.uri.clone(),
                        name: handler_name(&e.uri),
                    }
                });
            }
        }

        Ok(())
    }
}

/// A compiled endpoint.
pub struct Dispatch {
    name: String,
    get: Vec<Arm>,
    /// Index into `get` of the variant marked default.
    fallback: Option<usize>,
    put: Option<Arm>,
    delete: Option<Arm>,
}

/// One case of a switch: the query contract and the handler behind it.
struct Arm {
    accept: HeaderValue,
    required: Vec<String>,
    optional: Vec<String>,
    handler: BoxedHandler,
}

impl Arm {
    fn new(v: &Variant, uri: &str) -> Result<Self, SpecError> {
        let accept = HeaderValue::from_str(&v.accept).map_err(|_| SpecError::InvalidAccept {
            uri: uri.to_owned(),
            accept: v.accept.clone(),
        })?;
        let (required, optional) = v.query_contract();
        Ok(Self { accept, required, optional, handler: v.handler.clone() })
    }

    fn call(&self, req: &Request, reply: &mut Reply) -> Outcome {
        let res = check_query(req, &self.required, &self.optional);
        if !res.ok {
            return res;
        }
        self.handler.call(req, reply)
    }

    /// Like [`call`](Arm::call), then stamps the arm's `Accept` value as the
    /// response content type. Only explicit `Accept` matches get this.
    fn call_typed(&self, req: &Request, reply: &mut Reply) -> Outcome {
        let res = check_query(req, &self.required, &self.optional);
        if !res.ok {
            return res;
        }
        reply.headers_mut().insert(CONTENT_TYPE, self.accept.clone());
        self.handler.call(req, reply)
    }
}

impl Dispatch {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Routes `req` to the matching variant's handler.
    ///
    /// Methods other than GET, PUT and DELETE, or a method this endpoint
    /// does not declare, yield `405`. A GET whose `Accept` header matches no
    /// variant goes to the fallback variant: its query contract is still
    /// enforced, but no content type is set. Without a fallback the answer
    /// is `406`.
    pub fn call(&self, req: &Request, reply: &mut Reply) -> Outcome {
        let method = req.method();

        let arm = if *method == Method::GET && !self.get.is_empty() {
            let accept = req.headers().get(ACCEPT).map(HeaderValue::as_bytes).unwrap_or_default();
            match self.get.iter().find(|a| a.accept.as_bytes() == accept) {
                Some(arm) => return arm.call_typed(req, reply),
                None => {
                    debug!(dispatch = %self.name, "no Accept match, using fallback");
                    match self.fallback {
                        Some(i) => Some(&self.get[i]),
                        None => return Outcome::NOT_ACCEPTABLE,
                    }
                }
            }
        } else if *method == Method::PUT {
            self.put.as_ref()
        } else if *method == Method::DELETE {
            self.delete.as_ref()
        } else {
            None
        };

        match arm {
            Some(arm) => arm.call(req, reply),
            None => Outcome::METHOD_NOT_ALLOWED,
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accepts: Vec<&HeaderValue> = self.get.iter().map(|a| &a.accept).collect();
        f.debug_struct("Dispatch")
            .field("name", &self.name)
            .field("get", &accepts)
            .field("fallback", &self.fallback.is_some())
            .field("put", &self.put.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}
