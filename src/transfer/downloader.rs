use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::network::Transport;
use crate::transfer::uploader::FILE_NOT_FOUND_REPLY;
use crate::transfer::CHUNK_SIZE;
use crate::utils::{Result, ShareError};

/// Pulls one file at a time from a hosting peer. End-of-stream is the only
/// completion signal; the protocol carries no length or checksum, so a
/// truncated transfer is indistinguishable from a short file.
pub struct Downloader {
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Fetch `filename` from `peer` into the output directory, overwriting
    /// any existing file of that name. A body that is exactly the peer's
    /// not-found reply is reported as a miss instead of being written out.
    pub async fn fetch(&self, peer: SocketAddr, filename: &str) -> Result<PathBuf> {
        let mut stream = Transport::connect(&peer.to_string()).await?;
        Transport::send_line(&mut stream, filename).await?;

        // Buffer the first chunk before touching the disk: a short body that
        // matches the not-found literal means the peer refused the request.
        let mut first = vec![0u8; CHUNK_SIZE];
        let mut filled = 0;
        loop {
            let n = stream.read(&mut first[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == first.len() {
                break;
            }
        }
        if filled < first.len() && first[..filled] == *FILE_NOT_FOUND_REPLY.as_bytes() {
            return Err(ShareError::FileNotFound(filename.to_string()));
        }

        let path = self.output_dir.join(filename);
        let mut output = File::create(&path)
            .await
            .map_err(|e| ShareError::IoError(format!("Failed to create {:?}: {}", path, e)))?;
        output.write_all(&first[..filled]).await?;

        let mut total = filled as u64;
        if filled == first.len() {
            let mut chunk = vec![0u8; CHUNK_SIZE];
            loop {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                output.write_all(&chunk[..n]).await?;
                total += n as u64;
            }
        }
        output.flush().await?;

        info!("Downloaded {} ({} bytes) from {}", filename, total, peer);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use crate::transfer::Uploader;
    use std::sync::Arc;

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

    #[tokio::test]
    async fn downloaded_file_is_byte_identical() {
        let content: Vec<u8> = (0..5 * CHUNK_SIZE + 7).map(|i| (i % 239) as u8).collect();
        let (_store_dir, peer) = spawn_uploader(&[("big.bin", content.as_slice())]).await;

        let out_dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(out_dir.path().to_path_buf());
        let path = downloader.fetch(peer, "big.bin").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), content);
    }

    #[tokio::test]
    async fn repeated_downloads_are_idempotent() {
        let (_store_dir, peer) = spawn_uploader(&[("a.txt", b"stable content".as_slice())]).await;

        let out_dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(out_dir.path().to_path_buf());
        let first = downloader.fetch(peer, "a.txt").await.unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = downloader.fetch(peer, "a.txt").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), first_bytes);
    }

    #[tokio::test]
    async fn download_overwrites_an_existing_local_file() {
        let (_store_dir, peer) = spawn_uploader(&[("a.txt", b"fresh".as_slice())]).await;

        let out_dir = tempfile::tempdir().unwrap();
        std::fs::write(out_dir.path().join("a.txt"), "stale and longer").unwrap();

        let downloader = Downloader::new(out_dir.path().to_path_buf());
        let path = downloader.fetch(peer, "a.txt").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn missing_remote_file_creates_nothing() {
        let (_store_dir, peer) = spawn_uploader(&[("a.txt", b"hello".as_slice())]).await;

        let out_dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(out_dir.path().to_path_buf());

        let err = downloader.fetch(peer, "nope.txt").await.unwrap_err();
        assert!(matches!(err, ShareError::FileNotFound(_)));
        assert!(!out_dir.path().join("nope.txt").exists());
    }

    #[tokio::test]
    async fn empty_remote_file_downloads_as_empty() {
        let (_store_dir, peer) = spawn_uploader(&[("empty.txt", b"".as_slice())]).await;

        let out_dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(out_dir.path().to_path_buf());
        let path = downloader.fetch(peer, "empty.txt").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"");
    }
}
