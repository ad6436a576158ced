use std::convert::Infallible;
use std::sync::Arc;

use color_eyre::Result;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::report::builder::ReportBuilder;
use crate::report::identifier::IdentifierExtractor;
use crate::system::snapshot::SnapshotSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Report,
    MethodNotAllowed,
    NotFound,
}

pub fn route(method: &Method, path: &str) -> Route {
    match path {
        "/" | "/report" if *method == Method::GET => Route::Report,
        "/" | "/report" => Route::MethodNotAllowed,
        _ => Route::NotFound,
    }
}

/// Shared by every connection. Reports are still built from scratch per
/// request; the semaphore only bounds how many run at once.
pub struct ServerState<S, E> {
    builder: Arc<ReportBuilder<S, E>>,
    permits: Arc<Semaphore>,
}

impl<S, E> Clone for ServerState<S, E> {
    fn clone(&self) -> Self {
        ServerState {
            builder: Arc::clone(&self.builder),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<S, E> ServerState<S, E>
where
    S: SnapshotSource + 'static,
    E: IdentifierExtractor + 'static,
{
    pub fn new(builder: ReportBuilder<S, E>, max_concurrent_reports: usize) -> Self {
        ServerState {
            builder: Arc::new(builder),
            permits: Arc::new(Semaphore::new(max_concurrent_reports.max(1))),
        }
    }

    pub async fn handle(&self, method: &Method, path: &str) -> Response<Full<Bytes>> {
        match route(method, path) {
            Route::Report => self.report().await,
            Route::MethodNotAllowed => {
                tracing::info!(%method, path, "method not allowed");
                let mut response = text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("GET"));
                response
            }
            Route::NotFound => {
                tracing::info!(%method, path, "request to unknown endpoint");
                text(StatusCode::NOT_FOUND, "Not found")
            }
        }
    }

    async fn report(&self) -> Response<Full<Bytes>> {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return error_json(StatusCode::SERVICE_UNAVAILABLE, "server is shutting down");
        };

        // The permit travels with the build: a dropped request must not free
        // its slot while the blocking build is still running.
        let builder = Arc::clone(&self.builder);
        let build = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            builder.build()
        });
        match build.await {
            Ok(Ok(report)) => match serde_json::to_vec(&report) {
                Ok(body) => respond(StatusCode::OK, "application/json", body),
                Err(e) => {
                    tracing::error!("failed to serialize report: {e}");
                    error_json(StatusCode::INTERNAL_SERVER_ERROR, "failed to serialize report")
                }
            },
            Ok(Err(e)) => {
                tracing::error!("report failed: {e}");
                error_json(StatusCode::SERVICE_UNAVAILABLE, &e.to_string())
            }
            Err(e) => {
                tracing::error!("report task failed: {e}");
                error_json(StatusCode::INTERNAL_SERVER_ERROR, "report task failed")
            }
        }
    }
}

/// Serve `GET /report` until Ctrl-C.
pub async fn serve<S, E>(listener: TcpListener, state: ServerState<S, E>) -> Result<()>
where
    S: SnapshotSource + 'static,
    E: IdentifierExtractor + 'static,
{
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("failed to accept connection: {e}");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let state = state.clone();

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = state.clone();
                        async move {
                            let response = state.handle(req.method(), req.uri().path()).await;
                            Ok::<_, Infallible>(response)
                        }
                    });
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(%peer, "error serving connection: {err}");
                    }
                });
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!("failed to listen for Ctrl-C: {e}");
                }
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    respond(status, "text/plain", body.as_bytes().to_vec())
}

fn error_json(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = json!({ "error": message }).to_string().into_bytes();
    respond(status, "application/json", body)
}
