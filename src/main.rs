use clap::{Parser, Subcommand};
use filehub::{DirectoryServer, HubConfig, Node, PeerConfig, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filehub")]
#[command(about = "A minimal P2P file sharing system with a central directory service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the central directory service (fixed port, no arguments)
    Hub,
    /// Run a peer node
    Peer {
        /// Port this peer's file server listens on
        listen_port: u16,
        /// Directory holding the files this peer shares
        store_dir: PathBuf,
        /// IP address of the directory service
        #[arg(default_value = "127.0.0.1")]
        hub_ip: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    filehub::setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hub => {
            let server = DirectoryServer::bind(HubConfig::default()).await?;
            server.run().await
        }
        Commands::Peer {
            listen_port,
            store_dir,
            hub_ip,
        } => {
            let config = PeerConfig {
                listen_port,
                store_dir,
                hub_ip,
                ..PeerConfig::default()
            };
            let node = Node::new(config).await?;
            node.run().await
        }
    }
}
