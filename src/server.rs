//! HTTP transport and graceful shutdown.
//!
//! The server owns everything weft leaves out: accepting connections,
//! speaking HTTP/1.1 and HTTP/2, and putting bytes on the socket. Each
//! request body is collected up to a size limit, the request is handed to the
//! [`Router`], and the finished response is sent back as a single body.
//! Bodies over the limit are answered with `413` without reaching the router.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, and then returns from [`Server::serve`].

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::router::Router;
use crate::writer;

/// Environment variable read by [`Server::from_env`].
pub const ADDR_ENV: &str = "WEFT_ADDR";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
/// Largest request body collected before answering `413`.
pub const DEFAULT_MAX_BODY: usize = 64 * 1024;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    max_body: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// let server = weft::Server::bind("127.0.0.1:3000").unwrap();
    /// assert_eq!(server.addr().port(), 3000);
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let parsed = addr.parse().map_err(|source| Error::Addr { addr: addr.to_owned(), source })?;
        Ok(Self { addr: parsed, max_body: DEFAULT_MAX_BODY })
    }

    /// Binds to `$WEFT_ADDR`, or [`DEFAULT_ADDR`] when it is unset.
    pub fn from_env() -> Result<Self, Error> {
        let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
        Self::bind(&addr)
    }

    /// Caps the request body size, in bytes. Defaults to
    /// [`DEFAULT_MAX_BODY`].
    pub fn max_body(mut self, bytes: usize) -> Self {
        self.max_body = bytes;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        serve_listener(listener, router, self.max_body, shutdown_signal()).await
    }
}

/// Accept loop over an already bound listener, stopping when `shutdown`
/// resolves.
pub(crate) async fn serve_listener(
    listener: TcpListener,
    router: Router,
    max_body: usize,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<(), Error> {
    // Shared by every connection task; the table is never copied.
    let router = Arc::new(router);

    info!(addr = %listener.local_addr()?, max_body, "weft listening");

    // Tracks every connection task so shutdown can wait for all of them.
    let mut tasks = tokio::task::JoinSet::new();

    // `select!` polls the shutdown future by reference on every turn, so it
    // must not move between polls. `tokio::pin!` pins it on the stack.
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Arms are polled top to bottom instead of at random. Shutdown
            // comes first so a signal stops accepting even with a backlog.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                // Adapts tokio's AsyncRead/AsyncWrite to hyper's IO traits.
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(&router, req, max_body).await }
                    });

                    // `auto` serves HTTP/1.1 or HTTP/2, whichever the client speaks.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connections so the set stays small.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    // Drain: every in-flight connection finishes before we return.
    while tasks.join_next().await.is_some() {}

    info!("weft stopped");
    Ok(())
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. All failures become
/// status codes, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<hyper::body::Incoming>,
    max_body: usize,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, max_body).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let outcome = if e.is::<LengthLimitError>() {
                warn!(path = parts.uri.path(), max_body, "request body too large");
                Outcome::error(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
            } else {
                warn!(path = parts.uri.path(), "failed reading request body: {e}");
                Outcome::bad_request("unreadable request body")
            };
            let req = Request::new(parts.method, parts.uri, parts.headers, Bytes::new());
            let resp = writer::respond(&req, |_, _| outcome);
            return Ok(resp.map(Full::new));
        }
    };

    let req = Request::new(parts.method, parts.uri, parts.headers, body);
    Ok(router.respond(&req).map(Full::new))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
