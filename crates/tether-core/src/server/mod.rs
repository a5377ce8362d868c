//! Development server.
//!
//! The dev server plugin only depends on the [`DevServer`] and
//! [`ServerFactory`] traits: a server is built from [`ServerSettings`] and
//! started with [`DevServer::run`], which resolves once the server accepts
//! connections. [`HttpDevServer`] is the default implementation.
//!
//! ```text
//! GET /status  → "packager-status:running"   (device liveness probe)
//! GET /hot     → WebSocket, HMR messages
//! ```

mod hmr;

pub use hmr::{HmrBroadcaster, HmrMessage};

use hmr::next_message;

use crate::config::DevServerConfig;
use crate::error::{Error, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::future::BoxFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Body returned by the status endpoint.
pub const STATUS_RUNNING: &str = "packager-status:running";

/// Everything a server is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Pass-through server options.
    pub config: DevServerConfig,
    /// Compiler working directory.
    pub context: PathBuf,
}

/// A running (or runnable) development server.
pub trait DevServer: Send {
    /// Start listening. Resolves once connections are accepted.
    fn run(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Address the server is bound to, once running.
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    /// Push a message to connected hot-reload clients.
    fn broadcast(&self, _message: HmrMessage) {}
}

/// Builds dev servers.
pub trait ServerFactory: Send + Sync {
    fn create(&self, settings: ServerSettings) -> Result<Box<dyn DevServer>>;
}

/// Factory for [`HttpDevServer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpServerFactory;

impl ServerFactory for HttpServerFactory {
    fn create(&self, settings: ServerSettings) -> Result<Box<dyn DevServer>> {
        Ok(Box::new(HttpDevServer::new(settings)))
    }
}

/// HTTP dev server backed by axum.
pub struct HttpDevServer {
    settings: ServerSettings,
    hmr: HmrBroadcaster,
    addr: Option<SocketAddr>,
    task: Option<JoinHandle<()>>,
}

impl HttpDevServer {
    pub fn new(settings: ServerSettings) -> Self {
        Self {
            settings,
            hmr: HmrBroadcaster::new(),
            addr: None,
            task: None,
        }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/status", get(serve_status))
            .route("/hot", get(hot_websocket))
            .with_state(self.hmr.clone())
    }

    async fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Ok(());
        }

        let host = self.settings.config.host.as_str();
        let port = self.settings.config.port;
        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .map_err(|source| Error::ServerBind {
                addr: format!("{host}:{port}"),
                source,
            })?;
        let addr = listener.local_addr()?;
        let app = self.router();

        self.task = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "dev server stopped");
            }
        }));
        self.addr = Some(addr);

        info!(
            addr = %addr,
            platform = %self.settings.config.platform,
            context = %self.settings.context.display(),
            "dev server listening"
        );
        Ok(())
    }
}

impl DevServer for HttpDevServer {
    fn run(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.start())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    fn broadcast(&self, message: HmrMessage) {
        let receivers = self.hmr.send(message);
        debug!(receivers, "broadcast hmr message");
    }
}

impl Drop for HttpDevServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn serve_status() -> &'static str {
    STATUS_RUNNING
}

async fn hot_websocket(ws: WebSocketUpgrade, State(hmr): State<HmrBroadcaster>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_hot_socket(socket, hmr))
}

/// Forward broadcast messages until either side goes away.
async fn handle_hot_socket(mut socket: WebSocket, hmr: HmrBroadcaster) {
    let mut rx = hmr.subscribe();

    if socket
        .send(Message::Text(HmrMessage::Connected.to_json()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            message = next_message(&mut rx) => {
                let Some(message) = message else { break };
                if socket.send(Message::Text(message.to_json())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    debug!("hot client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn settings(port: u16) -> ServerSettings {
        ServerSettings {
            config: DevServerConfig {
                platform: "android".into(),
                port,
                host: "127.0.0.1".into(),
            },
            context: PathBuf::from("/app"),
        }
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let mut server = HttpServerFactory.create(settings(0)).unwrap();
        assert!(server.local_addr().is_none());

        server.run().await.unwrap();
        let addr = server.local_addr().unwrap();

        let response = get(addr, "/status").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with(STATUS_RUNNING));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let mut server = HttpDevServer::new(settings(0));
        server.run().await.unwrap();

        let response = get(server.local_addr().unwrap(), "/nope").await;
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let mut server = HttpDevServer::new(settings(port));
        let err = server.run().await.unwrap_err();
        assert!(matches!(err, Error::ServerBind { .. }));
        assert!(server.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_run_twice_keeps_first_listener() {
        let mut server = HttpDevServer::new(settings(0));
        server.run().await.unwrap();
        let first = server.local_addr();

        server.run().await.unwrap();
        assert_eq!(server.local_addr(), first);
    }
}
