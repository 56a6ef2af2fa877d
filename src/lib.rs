//! # weft
//!
//! Declare an HTTP API once; weft turns the declaration into dispatch and
//! writes every response with the same caching, compression, and error-body
//! rules.
//!
//! ## The contract
//!
//! An [`Api`] lists [`Endpoint`]s. Each endpoint is one exact URI with an
//! ordered set of GET [`Variant`]s (one per `Accept` value, at most one marked
//! as the fallback) and optional PUT and DELETE variants. Every variant
//! declares the query [`Parameter`]s it accepts; anything else is a `400`.
//!
//! [`Api::compile`] validates the declaration and builds one [`Dispatch`] per
//! endpoint. [`Router::mount`] registers them by exact URI.
//!
//! At request time the dispatch picks a handler, the handler fills a
//! [`Reply`] and returns an [`Outcome`], and [`write`] produces the response:
//!
//! - `Surrogate-Control` is `max-age=10`, or `max-age=86400` for `400`/`405`
//! - errors get a plain-text message or a canned HTML page ([`ErrorStyle`])
//! - large compressible bodies are gzipped for clients that accept it
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use weft::{Api, Endpoint, Outcome, Parameter, Reply, Request, Router, Server, Variant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::new().endpoint(
//!         Endpoint::new("/quake")
//!             .get(Variant::new(quake).accept("application/json").default()
//!                 .param(Parameter::required("publicID"))),
//!     );
//!
//!     let router = Router::new().mount(&api)?;
//!     Server::bind("0.0.0.0:3000")?.serve(router).await?;
//!     Ok(())
//! }
//!
//! fn quake(req: &Request, reply: &mut Reply) -> Outcome {
//!     // weft sends bytes; how you build them is up to you.
//!     reply.write(format!(r#"{{"query":"{}"}}"#, req.query()));
//!     Outcome::OK
//! }
//! ```

mod api;
mod compile;
mod error;
mod handler;
mod outcome;
mod query;
mod reply;
mod request;
mod router;
mod server;
mod sniff;
mod writer;

pub mod health;
pub mod policy;

pub use api::{Api, Endpoint, Parameter, Variant};
pub use compile::{Dispatch, Registration, handler_name};
pub use error::{Error, SpecError};
pub use handler::Handler;
pub use outcome::Outcome;
pub use query::check_query;
pub use reply::{ERROR_STYLE_HEADER, ErrorStyle, Reply};
pub use request::Request;
pub use router::Router;
pub use server::{ADDR_ENV, DEFAULT_ADDR, DEFAULT_MAX_BODY, Server};
pub use sniff::content_type as sniff_content_type;
pub use writer::{SURROGATE_CONTROL, respond, write};
