//! Built-in Kubernetes health-check endpoints.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! ```rust
//! use weft::{Api, Router, health};
//!
//! let api = health::endpoints()
//!     .into_iter()
//!     .fold(Api::new(), Api::endpoint);
//! let router = Router::new().mount(&api).unwrap();
//! ```
//!
//! To gate readiness on dependencies, declare your own `/readyz` endpoint
//! instead and return [`Outcome::service_unavailable`] while they are down.

use crate::api::{Endpoint, Variant};
use crate::outcome::Outcome;
use crate::reply::Reply;
use crate::request::Request;

pub const LIVENESS_URI: &str = "/healthz";
pub const READINESS_URI: &str = "/readyz";

/// Always `200 OK` with body `ok`.
pub fn liveness(_req: &Request, reply: &mut Reply) -> Outcome {
    reply.write("ok");
    Outcome::OK
}

/// Always `200 OK` with body `ready`.
pub fn readiness(_req: &Request, reply: &mut Reply) -> Outcome {
    reply.write("ready");
    Outcome::OK
}

/// `/healthz` and `/readyz` as plain-text GET endpoints taking no query
/// parameters.
pub fn endpoints() -> [Endpoint; 2] {
    let probe = |uri: &'static str, handler: fn(&Request, &mut Reply) -> Outcome| {
        Endpoint::new(uri).get(Variant::new(handler).accept("text/plain").default())
    };
    [probe(LIVENESS_URI, liveness), probe(READINESS_URI, readiness)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Api, Router};
    use bytes::Bytes;

    fn get(uri: &str) -> Request {
        http::Request::get(uri).body(Bytes::new()).unwrap().into()
    }

    #[test]
    fn probes_answer() {
        let api = endpoints().into_iter().fold(Api::new(), Api::endpoint);
        let router = Router::new().mount(&api).unwrap();

        let resp = router.respond(&get("/healthz"));
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body().as_ref(), b"ok");

        let resp = router.respond(&get("/readyz"));
        assert_eq!(resp.body().as_ref(), b"ready");

        let req: Request = http::Request::get("/readyz?verbose=1")
            .header("accept", "text/plain")
            .body(Bytes::new())
            .unwrap()
            .into();
        assert_eq!(router.respond(&req).status(), 400);
    }
}
