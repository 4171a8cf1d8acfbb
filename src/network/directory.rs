use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};

use crate::core::protocol::{self, Request};
use crate::core::{HubConfig, PeerRegistry};
use crate::network::Transport;
use crate::utils::Result;

/// The central directory service: accepts connections on one fixed port and
/// serves each on its own task. One request, one response, close.
pub struct DirectoryServer {
    listener: TcpListener,
    registry: Arc<PeerRegistry>,
}

impl DirectoryServer {
    /// Bind the listening socket. A failure here is a fatal startup error.
    pub async fn bind(config: HubConfig) -> Result<Self> {
        let listener = Transport::listen(config.port).await?;
        info!("Directory service listening on port {}", config.port);

        Ok(Self {
            listener,
            registry: Arc::new(PeerRegistry::new(config.max_peers)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever. Accept failures are logged and the loop
    /// continues; nothing short of process exit stops the service.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("Directory connection from {}", addr);

                    let registry = self.registry.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, registry).await {
                            warn!("Directory request from {} failed: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept directory connection: {}", e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Serve one accepted connection: read one request line, execute it against
/// the registry, write one response. Unrecognized requests (and registrations
/// that would overflow the registry) are dropped without a response. The
/// caller's IP always comes from the socket; only the port is taken from the
/// request body.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<PeerRegistry>,
) -> Result<()> {
    let line = Transport::read_line(&mut stream).await?;

    let Some(request) = Request::parse(&line) else {
        debug!("Dropping unrecognized request from {}: {:?}", addr, line);
        return Ok(());
    };

    let reply = match request {
        Request::Register { port, files } => {
            let endpoint = SocketAddr::new(addr.ip(), port);
            match registry.register(endpoint, files).await {
                Ok(_) => protocol::REGISTERED.to_string(),
                Err(e) => {
                    warn!("Dropping REGISTER from {}: {}", endpoint, e);
                    return Ok(());
                }
            }
        }
        Request::Query { filename } => match registry.find_owner(&filename).await {
            Some(endpoint) => endpoint.to_string(),
            None => protocol::NOT_FOUND.to_string(),
        },
        Request::List => {
            let entries = registry.list_all().await;
            if entries.is_empty() {
                protocol::NO_FILES_AVAILABLE.to_string()
            } else {
                entries
                    .iter()
                    .map(|(filename, endpoint)| protocol::format_entry(filename, endpoint))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Request::Exit { port } => {
            registry.deactivate(SocketAddr::new(addr.ip(), port)).await;
            protocol::GOODBYE.to_string()
        }
    };

    Transport::send_reply(&mut stream, &reply).await
}
