//! Declarative description of an HTTP API.
//!
//! An [`Api`] is built once at startup and handed to
//! [`Api::compile`](crate::Api::compile) or [`Router::mount`](crate::Router::mount).
//!
//! ```rust
//! use weft::{Api, Endpoint, Outcome, Parameter, Reply, Request, Variant};
//!
//! fn quake_json(_: &Request, reply: &mut Reply) -> Outcome {
//!     reply.write(r#"{"type":"Feature"}"#);
//!     Outcome::OK
//! }
//!
//! fn quake_csv(_: &Request, reply: &mut Reply) -> Outcome {
//!     reply.write("publicID,magnitude\n");
//!     Outcome::OK
//! }
//!
//! let api = Api::new().endpoint(
//!     Endpoint::new("/quake")
//!         .get(
//!             Variant::new(quake_json)
//!                 .accept("application/vnd.geo+json")
//!                 .default()
//!                 .param(Parameter::required("publicID")),
//!         )
//!         .get(Variant::new(quake_csv).accept("text/csv").param(Parameter::required("publicID"))),
//! );
//! assert!(api.compile().is_ok());
//! ```

use std::fmt;

use crate::handler::{BoxedHandler, Handler};

/// A set of endpoints. URIs must be non-empty and unique.
#[derive(Clone, Debug, Default)]
pub struct Api {
    pub endpoints: Vec<Endpoint>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }
}

/// One exact URI and the request variants it serves.
#[derive(Clone, Debug, Default)]
pub struct Endpoint {
    /// Registered verbatim; no patterns.
    pub uri: String,
    /// Content-negotiated GET variants, one per `Accept` value.
    pub get: Vec<Variant>,
    pub put: Option<Variant>,
    pub delete: Option<Variant>,
}

impl Endpoint {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), ..Self::default() }
    }

    pub fn get(mut self, variant: Variant) -> Self {
        self.get.push(variant);
        self
    }

    pub fn put(mut self, variant: Variant) -> Self {
        self.put = Some(variant);
        self
    }

    pub fn delete(mut self, variant: Variant) -> Self {
        self.delete = Some(variant);
        self
    }

    pub(crate) fn has_requests(&self) -> bool {
        !self.get.is_empty() || self.put.is_some() || self.delete.is_some()
    }
}

/// One method/content-type combination: its handler, the `Accept` value it
/// answers (ignored for PUT and DELETE), whether it is the GET fallback, and
/// the query parameters it accepts.
#[derive(Clone)]
pub struct Variant {
    pub handler: BoxedHandler,
    pub accept: String,
    /// Serve this variant when no `Accept` value matches.
    pub default: bool,
    pub parameters: Vec<Parameter>,
}

impl Variant {
    pub fn new(handler: impl Handler) -> Self {
        Self {
            handler: handler.into_boxed_handler(),
            accept: String::new(),
            default: false,
            parameters: Vec::new(),
        }
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    /// Marks this variant as the GET fallback.
    pub fn default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Splits the declared parameters into (required, optional) names.
    pub(crate) fn query_contract(&self) -> (Vec<String>, Vec<String>) {
        let (req, opt): (Vec<&Parameter>, Vec<&Parameter>) =
            self.parameters.iter().partition(|p| p.required);
        (
            req.into_iter().map(|p| p.id.clone()).collect(),
            opt.into_iter().map(|p| p.id.clone()).collect(),
        )
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("accept", &self.accept)
            .field("default", &self.default)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A query-string parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub id: String,
    pub required: bool,
}

impl Parameter {
    pub fn required(id: impl Into<String>) -> Self {
        Self { id: id.into(), required: true }
    }

    pub fn optional(id: impl Into<String>) -> Self {
        Self { id: id.into(), required: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outcome, Reply, Request};

    fn noop(_: &Request, _: &mut Reply) -> Outcome {
        Outcome::OK
    }

    #[test]
    fn query_contract_keeps_declaration_order() {
        let v = Variant::new(noop)
            .param(Parameter::optional("bbox"))
            .param(Parameter::required("publicID"))
            .param(Parameter::optional("limit"))
            .param(Parameter::required("type"));

        let (req, opt) = v.query_contract();
        assert_eq!(req, ["publicID", "type"]);
        assert_eq!(opt, ["bbox", "limit"]);
    }

    #[test]
    fn endpoint_requests() {
        assert!(!Endpoint::new("/quake").has_requests());
        assert!(Endpoint::new("/quake").delete(Variant::new(noop)).has_requests());
        assert!(Endpoint::new("/quake").get(Variant::new(noop)).has_requests());
    }
}
