//! Query-string validation.
//!
//! Every compiled dispatch calls [`check_query`] before invoking a handler, so
//! the legal query surface of a request is exactly the parameters declared
//! for it.

use crate::outcome::Outcome;
use crate::request::Request;

/// Checks that every `required` parameter is present with a non-empty value
/// and that nothing outside `required` and `optional` was sent.
///
/// A path containing `;` (raw or `%3B`) is rejected before the query is
/// looked at: caches that key on the full path while the origin ignores the
/// `;` segment can otherwise be poisoned.
pub fn check_query<R, O>(req: &Request, required: &[R], optional: &[O]) -> Outcome
where
    R: AsRef<str>,
    O: AsRef<str>,
{
    if is_cache_buster(req.path()) {
        return Outcome::bad_request("cache buster");
    }

    let mut params: Vec<(String, String)> = match serde_urlencoded::from_str(req.query()) {
        Ok(p) => p,
        Err(_) => return Outcome::bad_request("invalid query string"),
    };

    if required.is_empty() && optional.is_empty() {
        return if params.is_empty() {
            Outcome::OK
        } else {
            Outcome::bad_request("found unexpected query parameters")
        };
    }

    let mut missing = Vec::new();

    for key in required {
        let key: &str = key.as_ref();
        // The first value decides presence; an empty value counts as absent.
        let present = params
            .iter()
            .find(|(k, _)| k == key)
            .is_some_and(|(_, v)| !v.is_empty());

        if present {
            params.retain(|(k, _)| k != key);
        } else {
            missing.push(key);
        }
    }

    match missing.as_slice() {
        [] => {}
        [one] => return Outcome::bad_request(format!("missing required query parameter: {one}")),
        many => {
            return Outcome::bad_request(format!(
                "missing required query parameters: {}",
                many.join(", ")
            ));
        }
    }

    for key in optional {
        let key: &str = key.as_ref();
        params.retain(|(k, _)| k != key);
    }

    if !params.is_empty() {
        return Outcome::bad_request("found additional query parameters");
    }

    Outcome::OK
}

fn is_cache_buster(path: &str) -> bool {
    path.contains(';') || path.to_ascii_lowercase().contains("%3b")
}
