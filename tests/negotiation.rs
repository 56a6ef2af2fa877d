//! End-to-end: declare an API, mount it, and check the responses on the wire
//! side of the writer.

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use http::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use weft::{
    Api, Endpoint, ErrorStyle, Outcome, Parameter, Reply, Request, Router, SURROGATE_CONTROL,
    SpecError, Variant,
};

const FEATURE: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"publicID":"2013p407387"}}]}"#;

fn quake_json(_: &Request, reply: &mut Reply) -> Outcome {
    reply.write(FEATURE);
    Outcome::OK
}

fn quake_csv(_: &Request, reply: &mut Reply) -> Outcome {
    reply.write("publicID,magnitude\n2013p407387,4.1\n");
    Outcome::OK
}

fn quake_delete(_: &Request, reply: &mut Reply) -> Outcome {
    reply.set_error_style(ErrorStyle::Page);
    Outcome::service_unavailable("database is resting")
}

fn router() -> Router {
    let api = Api::new().endpoint(
        Endpoint::new("/quake")
            .get(
                Variant::new(quake_json)
                    .accept("application/json")
                    .default()
                    .param(Parameter::required("publicID")),
            )
            .get(Variant::new(quake_csv).accept("text/csv").param(Parameter::required("publicID")))
            .delete(Variant::new(quake_delete).param(Parameter::required("publicID"))),
    );
    Router::new().mount(&api).unwrap()
}

fn request(method: &str, uri: &str, headers: &[(http::HeaderName, &str)]) -> Request {
    let mut b = http::Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        b = b.header(name, *value);
    }
    b.body(Bytes::new()).unwrap().into()
}

fn header(resp: &http::Response<Bytes>, name: http::HeaderName) -> &str {
    resp.headers().get(name).map_or("", |v| v.to_str().unwrap())
}

#[test]
fn csv_variant_sets_its_content_type() {
    let resp = router().respond(&request("GET", "/quake?publicID=2013p407387", &[(ACCEPT, "text/csv")]));

    assert_eq!(resp.status(), 200);
    assert_eq!(header(&resp, CONTENT_TYPE), "text/csv");
    assert!(resp.body().starts_with(b"publicID,magnitude"));
}

#[test]
fn unknown_accept_falls_back_to_json_and_sniffs() {
    let resp = router().respond(&request("GET", "/quake?publicID=2013p407387", &[(ACCEPT, "text/xml")]));

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body().as_ref(), FEATURE.as_bytes());
    // The fallback path sets no content type; the writer sniffs one.
    assert_eq!(header(&resp, CONTENT_TYPE), "text/plain; charset=utf-8");
}

#[test]
fn fallback_enforces_the_query_contract() {
    let resp = router().respond(&request("GET", "/quake", &[(ACCEPT, "*/*")]));
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.body().as_ref(), b"missing required query parameter: publicID");

    let resp = router().respond(&request("GET", "/quake?publicID=1&extra=1", &[(ACCEPT, "*/*")]));
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.body().as_ref(), b"found additional query parameters");

    let cached = Api::new().endpoint(Endpoint::new("/quake;x").get(Variant::new(quake_json).default()));
    let router = Router::new().mount(&cached).unwrap();
    let resp = router.respond(&request("GET", "/quake;x", &[(ACCEPT, "*/*")]));
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.body().as_ref(), b"cache buster");
}

#[test]
fn gzip_round_trip() {
    let resp = router().respond(&request(
        "GET",
        "/quake?publicID=2013p407387",
        &[(ACCEPT, "application/json"), (ACCEPT_ENCODING, "gzip, deflate, br")],
    ));

    assert_eq!(header(&resp, CONTENT_ENCODING), "gzip");
    assert_eq!(header(&resp, CONTENT_TYPE), "application/json");

    let mut body = String::new();
    GzDecoder::new(&resp.body()[..]).read_to_string(&mut body).unwrap();
    assert_eq!(body, FEATURE);
}

#[test]
fn missing_parameter_is_a_cached_400() {
    let resp = router().respond(&request("GET", "/quake", &[(ACCEPT, "text/csv")]));

    assert_eq!(resp.status(), 400);
    assert_eq!(header(&resp, SURROGATE_CONTROL), "max-age=86400");
    assert_eq!(header(&resp, CONTENT_TYPE), "text/plain; charset=utf-8");
    assert_eq!(resp.body().as_ref(), b"missing required query parameter: publicID");
}

#[test]
fn cache_buster_path() {
    let resp = router().respond(&request("GET", "/quake?publicID=1", &[(ACCEPT, "text/csv")]));
    assert_eq!(resp.status(), 200);

    // Not registered under the exact URI, so it never reaches the validator.
    let resp = router().respond(&request("GET", "/quake;x?publicID=1", &[(ACCEPT, "text/csv")]));
    assert_eq!(resp.status(), 404);

    let cached = Api::new().endpoint(
        Endpoint::new("/quake;x").get(Variant::new(quake_csv).accept("text/csv").param(Parameter::required("publicID"))),
    );
    let router = Router::new().mount(&cached).unwrap();
    let resp = router.respond(&request("GET", "/quake;x?publicID=1", &[(ACCEPT, "text/csv")]));
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.body().as_ref(), b"cache buster");
}

#[test]
fn unknown_method_is_405() {
    let resp = router().respond(&request("POST", "/quake", &[]));

    assert_eq!(resp.status(), 405);
    assert_eq!(header(&resp, SURROGATE_CONTROL), "max-age=86400");
    assert_eq!(resp.body().as_ref(), b"method not allowed");
}

#[test]
fn not_found_message() {
    let resp = router().respond(&request("GET", "/felt", &[]));

    assert_eq!(resp.status(), 404);
    assert_eq!(header(&resp, CONTENT_TYPE), "text/plain; charset=utf-8");
    assert_eq!(header(&resp, SURROGATE_CONTROL), "max-age=10");
    assert_eq!(resp.body().as_ref(), b"not found");
}

#[test]
fn handler_chooses_error_page() {
    let resp = router().respond(&request("DELETE", "/quake?publicID=1", &[]));

    assert_eq!(resp.status(), 503);
    assert_eq!(header(&resp, CONTENT_TYPE), "text/html; charset=utf-8");
    assert_eq!(resp.body().as_ref(), weft::policy::error_page(503).as_bytes());
    assert!(resp.headers().get(weft::ERROR_STYLE_HEADER).is_none());
}

#[test]
fn invalid_api_mounts_nothing() {
    let api = Api::new()
        .endpoint(Endpoint::new("/ok").get(Variant::new(quake_json)))
        .endpoint(
            Endpoint::new("/quake")
                .get(Variant::new(quake_json).accept("application/json").default())
                .get(Variant::new(quake_csv).accept("text/csv").default()),
        );

    assert_eq!(
        Router::new().mount(&api).unwrap_err(),
        SpecError::MultipleDefaults("/quake".into())
    );
}
