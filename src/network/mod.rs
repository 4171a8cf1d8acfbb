pub mod directory;
pub mod hub;
pub mod transport;

pub use directory::DirectoryServer;
pub use hub::HubClient;
pub use transport::Transport;
