//! The Shard Server: a read-only static file server rooted at the
//! intermediate directory, routed under `/data/`.

use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::thread::JoinHandle;

use tower_http::services::ServeDir;

use crate::error::EngineError;

/// A running shard server. Dropping this does not stop the server; it
/// runs for the lifetime of the process.
pub struct ShardServer {
    pub local_addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl ShardServer {
    /// Starts serving `dir` under `http://<listen_address>/data/`. Binds
    /// synchronously so a bad `listen_address` is reported immediately:
    /// a failed shard server is fatal at startup.
    pub fn start(dir: PathBuf, listen_address: &str) -> Result<ShardServer, EngineError> {
        let std_listener = TcpListener::bind(listen_address)
            .map_err(|e| EngineError::HttpServe(format!("binding {}: {}", listen_address, e)))?;
        std_listener
            .set_nonblocking(true)
            .map_err(|e| EngineError::HttpServe(e.to_string()))?;
        let local_addr = std_listener
            .local_addr()
            .map_err(|e| EngineError::HttpServe(e.to_string()))?;

        let handle = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("shard server runtime failed to start: {e}");
                    return;
                }
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(std_listener) {
                    Ok(l) => l,
                    Err(e) => {
                        log::error!("shard server listener failed: {e}");
                        return;
                    }
                };
                let app = axum::Router::new().nest_service("/data", ServeDir::new(&dir));
                if let Err(e) = axum::serve(listener, app).await {
                    log::error!("shard server stopped: {e}");
                }
            });
        });

        Ok(ShardServer {
            local_addr,
            _handle: handle,
        })
    }
}
