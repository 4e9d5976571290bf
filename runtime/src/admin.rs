//! Admin HTTP server (SPEC_FULL.md §8 ambient addition): `/ready` and a
//! Prometheus `/metrics` endpoint, modeled directly on
//! `linkerd-policy-controller`'s own `src/admin.rs`.

use futures::future;
use hyper::{Body, Request, Response};
use prometheus_client::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument};

#[instrument(skip(ready, registry))]
pub async fn serve(
    addr: SocketAddr,
    ready: watch::Receiver<bool>,
    registry: Arc<Registry>,
) -> Result<(), hyper::Error> {
    let server = hyper::server::Server::bind(&addr).serve(hyper::service::make_service_fn(move |_conn| {
        let ready = ready.clone();
        let registry = registry.clone();
        future::ok::<_, hyper::Error>(hyper::service::service_fn(move |req: Request<Body>| {
            let ready = ready.clone();
            let registry = registry.clone();
            future::ok::<_, hyper::Error>(match req.uri().path() {
                "/ready" => handle_ready(&ready, req),
                "/metrics" => handle_metrics(&registry),
                _ => Response::builder()
                    .status(hyper::StatusCode::NOT_FOUND)
                    .body(Body::default())
                    .unwrap(),
            })
        }))
    }));
    let addr = server.local_addr();
    info!(%addr, "admin HTTP server listening");
    server.await
}

fn handle_ready(ready: &watch::Receiver<bool>, req: Request<Body>) -> Response<Body> {
    match *req.method() {
        hyper::Method::GET | hyper::Method::HEAD => {
            if *ready.borrow() {
                Response::builder()
                    .status(hyper::StatusCode::OK)
                    .header(hyper::header::CONTENT_TYPE, "text/plain")
                    .body("ready\n".into())
                    .unwrap()
            } else {
                Response::builder()
                    .status(hyper::StatusCode::INTERNAL_SERVER_ERROR)
                    .header(hyper::header::CONTENT_TYPE, "text/plain")
                    .body("not ready\n".into())
                    .unwrap()
            }
        }
        _ => Response::builder()
            .status(hyper::StatusCode::METHOD_NOT_ALLOWED)
            .body(Body::default())
            .unwrap(),
    }
}

fn handle_metrics(registry: &Registry) -> Response<Body> {
    let mut buf = String::new();
    match prometheus_client::encoding::text::encode(&mut buf, registry) {
        Ok(()) => Response::builder()
            .status(hyper::StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(buf))
            .unwrap(),
        Err(error) => {
            tracing::warn!(%error, "failed to encode metrics");
            Response::builder()
                .status(hyper::StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::default())
                .unwrap()
        }
    }
}
