use log::{debug, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::utils::{Result, ShareError};

/// Longest request line any listening socket will accept.
pub const MAX_REQUEST_LEN: usize = 4096;

pub struct Transport;

impl Transport {
    pub async fn connect(addr: &str) -> Result<TcpStream> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            ShareError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
        })?;

        debug!("Connected to {}", addr);
        Ok(stream)
    }

    /// Bind a TCP listener on all interfaces with address reuse enabled.
    pub async fn listen(port: u16) -> Result<TcpListener> {
        let addr: SocketAddr = format!("0.0.0.0:{}", port)
            .parse()
            .map_err(|e| ShareError::NetworkError(format!("Invalid listen address: {}", e)))?;

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ShareError::NetworkError(format!("Failed to create socket: {}", e)))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| ShareError::NetworkError(format!("Failed to set reuse_address: {}", e)))?;

        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        if let Err(e) = socket.set_reuse_port(true) {
            warn!("Could not set SO_REUSEPORT (not critical): {}", e);
        }

        socket
            .bind(&addr.into())
            .map_err(|e| ShareError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

        socket
            .listen(128)
            .map_err(|e| ShareError::NetworkError(format!("Failed to listen on {}: {}", addr, e)))?;

        socket
            .set_nonblocking(true)
            .map_err(|e| ShareError::NetworkError(format!("Failed to set nonblocking: {}", e)))?;

        TcpListener::from_std(socket.into()).map_err(|e| {
            ShareError::NetworkError(format!("Failed to convert to tokio listener: {}", e))
        })
    }

    /// Write one newline-terminated request line and flush it.
    pub async fn send_line(stream: &mut TcpStream, line: &str) -> Result<()> {
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await?;
        Ok(())
    }

    /// Write a response exactly as given, with no terminator. Responses are
    /// framed by closing the connection, not by a newline.
    pub async fn send_reply(stream: &mut TcpStream, reply: &str) -> Result<()> {
        stream.write_all(reply.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Read one request line: everything up to the first newline, or up to
    /// end-of-stream if the peer closes without sending one. Trailing CR/LF
    /// is stripped. Lines beyond `MAX_REQUEST_LEN` are rejected.
    pub async fn read_line(stream: &mut TcpStream) -> Result<String> {
        let mut line = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            if let Some(pos) = chunk[..n].iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&chunk[..pos]);
                break;
            }
            line.extend_from_slice(&chunk[..n]);
            if line.len() > MAX_REQUEST_LEN {
                return Err(ShareError::RequestTooLarge(line.len()));
            }
        }

        let line = String::from_utf8_lossy(&line).into_owned();
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Read a response until the peer closes its end. The protocol has no
    /// length prefix; close-of-stream is the only framing.
    pub async fn read_reply(stream: &mut TcpStream) -> Result<String> {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;

        let reply = String::from_utf8_lossy(&buffer).into_owned();
        Ok(reply.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}
