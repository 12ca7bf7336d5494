// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::webhook::Webhook;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

/// Serve `webhook` on `listener` until `shutdown` completes, then let open
/// connections finish their in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    webhook: Webhook,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let webhook = Arc::new(webhook);
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    info!(
        "Webhook listening on {} ({})",
        listener.local_addr()?,
        if tls.is_some() { "https" } else { "http" }
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                debug!("Accepted connection from {}", peer);

                let webhook = webhook.clone();
                let stop_rx = stop_rx.clone();
                let tls = tls.clone();
                connections.spawn(async move {
                    match tls {
                        Some(acceptor) => match acceptor.accept(stream).await {
                            Ok(stream) => serve_connection(stream, webhook, stop_rx).await,
                            Err(e) => debug!("TLS handshake with {} failed: {}", peer, e),
                        },
                        None => serve_connection(stream, webhook, stop_rx).await,
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down webhook, waiting for {} open connections", connections.len());
                break;
            }
            // Reap finished connections so the set doesn't grow unbounded
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    let _ = stop_tx.send(true);
    while connections.join_next().await.is_some() {}

    info!("Webhook stopped");
    Ok(())
}

async fn serve_connection<I>(io: I, webhook: Arc<Webhook>, mut stop: watch::Receiver<bool>)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req: Request<Incoming>| {
        let webhook = webhook.clone();
        async move { Ok::<_, Infallible>(webhook.handle(req).await) }
    });

    let conn = http1::Builder::new().serve_connection(TokioIo::new(io), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                debug!("Connection closed with error: {}", e);
            }
        }
        _ = stop.changed() => {
            conn.as_mut().graceful_shutdown();
            if let Err(e) = conn.as_mut().await {
                debug!("Connection closed with error during shutdown: {}", e);
            }
        }
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
