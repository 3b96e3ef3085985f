//! HTTP server for the status page, timeline and JSON report.
//!
//! | Route          | Response                          |
//! |----------------|-----------------------------------|
//! | `/`            | HTML status page                  |
//! | `/graph`       | SVG timeline (`image/svg+xml`)    |
//! | `/status.json` | [`StatusReport`] as JSON          |
//! | `/health`      | `OK`                              |
//! | `/healthz`     | `OK`                              |
//!
//! Everything else is `404`; methods other than `GET` get `405`.

use std::convert::Infallible;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tablewatch_types::current_timestamp_ms;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::data::{SharedHistory, StatusReader};
use crate::ui::{render_page, StatusReport, StatusView, Theme, TimelineRenderer, SVG_CONTENT_TYPE};

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const JSON: &str = "application/json";

/// Everything a request handler reads.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Latest committed status.
    pub status: StatusReader,
    /// Recorded samples behind `/graph` and `/status.json`.
    pub history: SharedHistory,
    /// Age after which the current status is shown as unknown.
    pub staleness: Duration,
    /// Interval of the page's meta refresh.
    pub page_refresh: Duration,
    /// Draws the history timeline.
    pub renderer: TimelineRenderer,
    /// Colors for the page and the timeline.
    pub theme: Theme,
}

impl ServerState {
    pub fn new(status: StatusReader, history: SharedHistory, staleness: Duration) -> Self {
        Self {
            status,
            history,
            staleness,
            page_refresh: Duration::from_secs(60),
            renderer: TimelineRenderer::default(),
            theme: Theme::default(),
        }
    }

    fn view(&self, now_ms: u64) -> StatusView {
        StatusView::build(&self.status.read(), now_ms, self.staleness, &self.theme)
    }
}

/// Answer one request.
///
/// `now_ms` is the clock used to classify the current status.
pub fn route(
    method: &Method,
    path: &str,
    state: &ServerState,
    remote: IpAddr,
    now_ms: u64,
) -> Response<Full<Bytes>> {
    if *method != Method::GET {
        let mut response = respond(StatusCode::METHOD_NOT_ALLOWED, TEXT, "Method Not Allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET"));
        return response;
    }

    match path {
        "/" => {
            let view = state.view(now_ms);
            info!(ip = %remote, state = view.label, "served status page");
            respond(StatusCode::OK, HTML, render_page(&view, state.page_refresh))
        }
        "/graph" => {
            let svg = state.history.with(|history| state.renderer.render(history));
            debug!(ip = %remote, "served timeline");
            respond(StatusCode::OK, SVG_CONTENT_TYPE, svg)
        }
        "/status.json" => {
            let report = StatusReport::new(
                state.view(now_ms),
                state.staleness,
                state.history.snapshot(),
            );
            match serde_json::to_string(&report) {
                Ok(body) => respond(StatusCode::OK, JSON, body),
                Err(e) => {
                    error!(error = %e, "failed to serialize status report");
                    respond(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        TEXT,
                        "Internal Server Error",
                    )
                }
            }
        }
        "/health" | "/healthz" => respond(StatusCode::OK, TEXT, "OK"),
        _ => respond(StatusCode::NOT_FOUND, TEXT, "Not Found"),
    }
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// A bound status server.
#[derive(Debug)]
pub struct StatusServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl StatusServer {
    /// Bind to `addr`. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, state: ServerState) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "status server listening");

        loop {
            let (stream, remote) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let state = state.clone();
                    async move { handle_request(req, &state, remote) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(ip = %remote.ip(), error = %e, "status connection error");
                }
            });
        }
    }
}

fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: &ServerState,
    remote: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(
        req.method(),
        req.uri().path(),
        state,
        remote.ip(),
        current_timestamp_ms(),
    ))
}
