//! Minimal weft example: a content-negotiated quake endpoint plus health
//! checks.
//!
//! Run with:
//!   RUST_LOG=debug WEFT_ADDR=127.0.0.1:3000 cargo run --example basic
//!
//! Try:
//!   curl -H 'Accept: text/csv' 'http://localhost:3000/quake?publicID=2013p407387'
//!   curl --compressed 'http://localhost:3000/quake?publicID=2013p407387'
//!   curl 'http://localhost:3000/quake'                      # 400, missing publicID
//!   curl -X DELETE 'http://localhost:3000/quake?publicID=1' # 503 error page
//!   curl http://localhost:3000/healthz

use weft::{
    Api, Endpoint, ErrorStyle, Outcome, Parameter, Reply, Request, Router, Server, Variant, health,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let api = health::endpoints().into_iter().fold(
        Api::new().endpoint(
            Endpoint::new("/quake")
                .get(
                    Variant::new(quake_geojson)
                        .accept("application/vnd.geo+json")
                        .default()
                        .param(Parameter::required("publicID")),
                )
                .get(
                    Variant::new(quake_csv)
                        .accept("text/csv")
                        .param(Parameter::required("publicID")),
                )
                .delete(Variant::new(delete_quake).param(Parameter::required("publicID"))),
        ),
        Api::endpoint,
    );

    let router = Router::new().mount(&api)?;
    Server::from_env()?.serve(router).await?;
    Ok(())
}

fn public_id(req: &Request) -> String {
    serde_urlencoded::from_str::<Vec<(String, String)>>(req.query())
        .ok()
        .and_then(|pairs| pairs.into_iter().find(|(k, _)| k == "publicID"))
        .map(|(_, v)| v)
        .unwrap_or_default()
}

// GET /quake, the fallback variant. It runs for any unmatched Accept value,
// so it sets its own content type.
fn quake_geojson(req: &Request, reply: &mut Reply) -> Outcome {
    reply.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/vnd.geo+json"),
    );
    reply.write(format!(
        r#"{{"type":"Feature","properties":{{"publicID":"{}","magnitude":4.1}}}}"#,
        public_id(req)
    ));
    Outcome::OK
}

// GET /quake with Accept: text/csv
fn quake_csv(req: &Request, reply: &mut Reply) -> Outcome {
    reply.write(format!("publicID,magnitude\n{},4.1\n", public_id(req)));
    Outcome::OK
}

// DELETE /quake renders an HTML error page while the store is read-only.
fn delete_quake(_req: &Request, reply: &mut Reply) -> Outcome {
    reply.set_error_style(ErrorStyle::Page);
    Outcome::service_unavailable("quake store is read-only")
}
