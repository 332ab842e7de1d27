// Server loop module
// Accepts connections until a shutdown signal, then drains in-flight requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed, open connections are told to finish
/// their current request, and the loop waits up to
/// `performance.shutdown_grace` seconds for them.
pub async fn serve_until<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: std::future::Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    let signal = loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            signal = &mut shutdown => break signal,
        }
    };

    drop(listener);
    logger::log_shutdown(signal, active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    if tokio::time::timeout(grace, graceful.shutdown()).await.is_err() {
        logger::log_warning(&format!(
            "Grace period of {}s elapsed with {} connection(s) still open",
            grace.as_secs(),
            active_connections.load(Ordering::SeqCst)
        ));
    }
}

/// Run the accept loop until SIGTERM/SIGINT
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    serve_until(listener, state, shutdown_signal()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::error::MailError;
    use crate::mail::{EmailSender, OutboundEmail, SendReceipt};
    use async_trait::async_trait;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    struct NoopMailer;

    #[async_trait]
    impl EmailSender for NoopMailer {
        async fn send(&self, _email: &OutboundEmail) -> Result<SendReceipt, MailError> {
            Ok(SendReceipt {
                id: Some("noop".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_serves_over_tcp_and_stops_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut config = test_config();
        config.performance.shutdown_grace = 1;
        let state = Arc::new(AppState::new(config, Arc::new(NoopMailer)));

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(listener, state, async move {
            let _ = stop_rx.await;
            "test"
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"OPTIONS /api/send HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"), "got: {raw}");
        assert!(raw
            .to_ascii_lowercase()
            .contains("access-control-allow-origin: https://cinedot.in"));

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server should stop after the shutdown signal")
            .unwrap();
    }
}
