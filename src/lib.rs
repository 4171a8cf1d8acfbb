//! Peer-to-peer file sharing with a central directory service.
//!
//! A hub process keeps a registry of which peers are online and which files
//! each one hosts. Peers register at startup, resolve filenames to owners
//! through the hub, then pull files directly from each other; every peer
//! also runs a file server of its own.

pub mod core;
pub mod network;
pub mod storage;
pub mod transfer;
pub mod utils;

// Re-export main types
pub use self::core::{HubConfig, Node, PeerConfig, PeerRegistry, DEFAULT_HUB_PORT};
pub use network::{DirectoryServer, HubClient, Transport};
pub use storage::FileStore;
pub use transfer::{Downloader, Uploader};
pub use utils::{
    setup_logging,
    error::{Result, ShareError},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
