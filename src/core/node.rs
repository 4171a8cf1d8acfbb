use log::{error, info, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::PeerConfig;
use crate::network::HubClient;
use crate::storage::FileStore;
use crate::transfer::{Downloader, Uploader};
use crate::utils::Result;

/// A peer node: a short-lived client of the hub (register, query, download,
/// unregister) and, in the background, a long-running file server for other
/// peers.
pub struct Node {
    config: PeerConfig,
    store: Arc<FileStore>,
    hub: HubClient,
    downloader: Downloader,
}

impl Node {
    /// Wires the node up. Fails if the store directory cannot be read or the
    /// hub address does not parse; both are startup errors.
    pub async fn new(config: PeerConfig) -> Result<Self> {
        let store = Arc::new(FileStore::open(config.store_dir.clone()).await?);
        let hub = HubClient::new(&config.hub_ip, config.hub_port)?;
        let downloader = Downloader::new(config.download_dir.clone());

        Ok(Self {
            config,
            store,
            hub,
            downloader,
        })
    }

    /// Run the node: bind and spawn the file server, register with the hub,
    /// service operator commands until `exit`, then unregister. The file
    /// server task keeps running until the process exits; there is no
    /// shutdown handshake for it.
    pub async fn run(&self) -> Result<()> {
        let uploader = Uploader::bind(self.config.listen_port, self.store.clone()).await?;
        tokio::spawn(uploader.run());

        self.register().await;
        self.interactive_loop().await?;
        self.unregister().await;
        Ok(())
    }

    /// Announce this node and its files to the hub. A failure here is
    /// reported but not fatal.
    async fn register(&self) {
        let files = match self.store.scan().await {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to scan store directory: {}", e);
                Vec::new()
            }
        };

        match self.hub.register(self.config.listen_port, &files).await {
            Ok(()) => info!("Registered {} files with the directory service", files.len()),
            Err(e) => error!("Registration with directory service failed: {}", e),
        }
    }

    /// One command per line from the operator: `list`, `exit`, or a filename
    /// to download. Failures are reported and the loop moves on; nothing is
    /// retried.
    async fn interactive_loop(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("\nEnter 'list' to see files, a filename to download, or 'exit': ");
            let _ = std::io::stdout().flush();

            let Some(line) = lines.next_line().await? else {
                break; // end of input behaves like `exit`
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match input {
                "exit" => break,
                "list" => self.show_listing().await,
                filename => self.download(filename).await,
            }
        }

        Ok(())
    }

    async fn show_listing(&self) {
        match self.hub.list().await {
            Ok(listing) => {
                println!("\n--- Available Files ---\n{}\n-----------------------", listing)
            }
            Err(e) => error!("LIST request failed: {}", e),
        }
    }

    /// Resolve the owner through the hub, then pull the file straight from
    /// that peer.
    async fn download(&self, filename: &str) {
        let owner = match self.hub.query(filename).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                println!("{} is not hosted by any peer", filename);
                return;
            }
            Err(e) => {
                error!("QUERY request failed: {}", e);
                return;
            }
        };

        println!("Connecting to peer at {}...", owner);
        match self.downloader.fetch(owner, filename).await {
            Ok(path) => println!("Download of {} completed ({})", filename, path.display()),
            Err(e) => error!("Download of {} failed: {}", filename, e),
        }
    }

    async fn unregister(&self) {
        match self.hub.exit(self.config.listen_port).await {
            Ok(()) => info!("Unregistered from directory service"),
            Err(e) => warn!("EXIT request failed: {}", e),
        }
    }
}
