use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Port the directory service listens on. The hub takes no arguments and
/// always binds here.
pub const DEFAULT_HUB_PORT: u16 = 8080;

/// Maximum number of peer records the registry will hold. Records are never
/// deleted, only deactivated, so this counts inactive records too.
pub const DEFAULT_MAX_PEERS: usize = 64;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HubConfig {
    pub port: u16,
    pub max_peers: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HUB_PORT,
            max_peers: DEFAULT_MAX_PEERS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Port this peer's own file server listens on, advertised to the hub.
    pub listen_port: u16,
    /// Directory the peer shares files from.
    pub store_dir: PathBuf,
    pub hub_ip: String,
    pub hub_port: u16,
    /// Where downloaded files are written.
    pub download_dir: PathBuf,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            listen_port: 9000,
            store_dir: PathBuf::from("./shared"),
            hub_ip: "127.0.0.1".to_string(),
            hub_port: DEFAULT_HUB_PORT,
            download_dir: PathBuf::from("."),
        }
    }
}
