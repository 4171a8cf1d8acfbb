use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};

use crate::network::Transport;
use crate::storage::FileStore;
use crate::transfer::CHUNK_SIZE;
use crate::utils::Result;

/// Reply sent when a requested file does not resolve in the store. Sent as
/// raw bytes on the transfer stream; there is no other framing.
pub const FILE_NOT_FOUND_REPLY: &str = "ERROR: File not found.";

/// Every peer's file server: accepts download connections on the node's
/// advertised port and streams requested files back.
pub struct Uploader {
    listener: TcpListener,
    store: Arc<FileStore>,
}

impl Uploader {
    /// Bind the advertised port. The node binds before it registers with
    /// the hub; a failure here is a fatal startup error.
    pub async fn bind(port: u16, store: Arc<FileStore>) -> Result<Self> {
        let listener = Transport::listen(port).await?;
        info!("Peer file server listening on port {}", listener.local_addr()?.port());

        Ok(Self { listener, store })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept download connections until the process exits. Each connection
    /// is served on its own task; a failed transfer only costs that task.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let store = self.store.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve(stream, addr, store).await {
                            warn!("Transfer to {} aborted: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept transfer connection: {}", e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Serve one download: read the requested name, then stream the file in
/// fixed-size chunks (read one, forward it, repeat) so memory stays bounded
/// whatever the file size. A write failure mid-transfer just closes the
/// connection; the receiver sees a short stream.
async fn serve(mut stream: TcpStream, addr: SocketAddr, store: Arc<FileStore>) -> Result<()> {
    let name = Transport::read_line(&mut stream).await?;
    debug!("Download request from {} for {:?}", addr, name);

    let mut file = match store.open_file(&name).await {
        Ok(file) => file,
        Err(e) => {
            debug!("Refusing download request from {}: {}", addr, e);
            Transport::send_reply(&mut stream, FILE_NOT_FOUND_REPLY).await?;
            return Ok(());
        }
    };

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut sent: u64 = 0;
    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        stream.write_all(&chunk[..n]).await?;
        sent += n as u64;
    }
    stream.flush().await?;

    info!("Finished sending {:?} ({} bytes) to {}", name, sent, addr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn spawn_uploader(files: &[(&str, &[u8])]) -> (tempfile::TempDir, SocketAddr) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let store = Arc::new(FileStore::open(dir.path().to_path_buf()).await.unwrap());
        let uploader = Uploader::bind(0, store).await.unwrap();
        let port = uploader.local_addr().unwrap().port();
        tokio::spawn(uploader.run());
        (dir, SocketAddr::from(([127, 0, 0, 1], port)))
    }

    async fn request(addr: SocketAddr, name: &str) -> Vec<u8> {
        let mut stream = Transport::connect(&addr.to_string()).await.unwrap();
        Transport::send_line(&mut stream, name).await.unwrap();
        let mut body = Vec::new();
        stream.read_to_end(&mut body).await.unwrap();
        body
    }

    #[tokio::test]
    async fn streams_the_exact_file_bytes() {
        let (_dir, addr) = spawn_uploader(&[("a.txt", b"hello world".as_slice())]).await;
        assert_eq!(request(addr, "a.txt").await, b"hello world");
    }

    #[tokio::test]
    async fn streams_files_larger_than_one_chunk() {
        let content: Vec<u8> = (0..3 * CHUNK_SIZE + 123).map(|i| (i % 251) as u8).collect();
        let (_dir, addr) = spawn_uploader(&[("big.bin", content.as_slice())]).await;
        assert_eq!(request(addr, "big.bin").await, content);
    }

    #[tokio::test]
    async fn missing_file_yields_the_error_literal() {
        let (_dir, addr) = spawn_uploader(&[("a.txt", b"hello".as_slice())]).await;
        assert_eq!(request(addr, "nope.txt").await, FILE_NOT_FOUND_REPLY.as_bytes());
    }

    #[tokio::test]
    async fn path_escaping_request_yields_the_error_literal() {
        let (_dir, addr) = spawn_uploader(&[("a.txt", b"hello".as_slice())]).await;
        assert_eq!(request(addr, "../a.txt").await, FILE_NOT_FOUND_REPLY.as_bytes());
    }
}
