use crate::foundation::MixError;
use log::{debug, info};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, MixError> {
    let listener = TcpListener::bind(addr).await.map_err(|err| MixError::connection("bind", format!("{addr}: {err}")))?;
    info!("coordinator listening addr={}", listener.local_addr().unwrap_or(addr));
    Ok(listener)
}

/// Connects with an optional deadline and disables Nagle.
pub async fn connect(addr: &str, timeout: Option<Duration>) -> Result<TcpStream, MixError> {
    debug!("connecting to coordinator addr={}", addr);
    let connecting = TcpStream::connect(addr);
    let stream = match timeout {
        Some(limit) => tokio::time::timeout(limit, connecting)
            .await
            .map_err(|_| MixError::Timeout { phase: "connect".to_string(), timeout_secs: limit.as_secs() })?,
        None => connecting.await,
    }
    .map_err(|err| MixError::connection("connect", format!("{addr}: {err}")))?;
    stream.set_nodelay(true).map_err(|err| MixError::connection("set_nodelay", err))?;
    Ok(stream)
}
