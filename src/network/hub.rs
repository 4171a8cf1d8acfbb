use log::debug;
use std::net::{IpAddr, SocketAddr};

use crate::core::protocol::{self, Request};
use crate::network::Transport;
use crate::utils::{Result, ShareError};

/// Client side of the directory protocol. Every request opens its own
/// connection, sends one line, and reads the response until the hub closes.
pub struct HubClient {
    addr: SocketAddr,
}

impl HubClient {
    pub fn new(ip: &str, port: u16) -> Result<Self> {
        let ip: IpAddr = ip
            .parse()
            .map_err(|e| ShareError::ConfigError(format!("Invalid hub address {}: {}", ip, e)))?;

        Ok(Self {
            addr: SocketAddr::new(ip, port),
        })
    }

    pub async fn register(&self, own_port: u16, files: &[String]) -> Result<()> {
        let request = Request::Register {
            port: own_port,
            files: files.to_vec(),
        };
        let reply = self.request(&request.encode()).await?;
        if reply != protocol::REGISTERED {
            return Err(ShareError::InvalidResponse(format!(
                "Expected {}, got {:?}",
                protocol::REGISTERED,
                reply
            )));
        }
        Ok(())
    }

    /// Resolve the owner of `filename`. `Ok(None)` is a miss; anything other
    /// than an `ip:port` reply is an error.
    pub async fn query(&self, filename: &str) -> Result<Option<SocketAddr>> {
        let request = Request::Query {
            filename: filename.to_string(),
        };
        let reply = self.request(&request.encode()).await?;
        if reply == protocol::NOT_FOUND {
            return Ok(None);
        }

        let owner = reply.parse::<SocketAddr>().map_err(|_| {
            ShareError::InvalidResponse(format!("Expected an owner endpoint, got {:?}", reply))
        })?;
        Ok(Some(owner))
    }

    /// The hub's full listing, one `<file> [hosted by <ip>:<port>]` entry per
    /// line, or the no-files sentinel.
    pub async fn list(&self) -> Result<String> {
        self.request(&Request::List.encode()).await
    }

    pub async fn exit(&self, own_port: u16) -> Result<()> {
        let reply = self.request(&Request::Exit { port: own_port }.encode()).await?;
        if reply != protocol::GOODBYE {
            return Err(ShareError::InvalidResponse(format!(
                "Expected {}, got {:?}",
                protocol::GOODBYE,
                reply
            )));
        }
        Ok(())
    }

    async fn request(&self, line: &str) -> Result<String> {
        let mut stream = Transport::connect(&self.addr.to_string()).await?;
        Transport::send_line(&mut stream, line).await?;
        let reply = Transport::read_reply(&mut stream).await?;

        debug!("Hub replied to {:?} with {:?}", line, reply);
        Ok(reply)
    }
}
