use log::{debug, info};
use std::net::SocketAddr;
use tokio::sync::Mutex;

use crate::utils::{Result, ShareError};

/// Registration-order index of a record. Later registrations from the same
/// endpoint get fresh ids; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub usize);

#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub endpoint: SocketAddr,
    pub hosted_files: Vec<String>,
    pub active: bool,
}

/// The hub's record of which peers are online and what they host.
///
/// Records are append-only: EXIT deactivates, nothing deletes. A peer that
/// re-registers gets a new record while its old one stays behind, inactive.
/// Every operation takes the single internal lock for its whole duration and
/// releases it before returning, so lookups always observe a consistent
/// snapshot and the lock is never held across network I/O.
pub struct PeerRegistry {
    inner: Mutex<Vec<PeerRecord>>,
    max_peers: usize,
}

impl PeerRegistry {
    pub fn new(max_peers: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            max_peers,
        }
    }

    /// Append a new active record. The file list is stored verbatim, without
    /// deduplication or validation. Fails once the record count (active and
    /// inactive) reaches the configured maximum.
    pub async fn register(&self, endpoint: SocketAddr, files: Vec<String>) -> Result<RecordId> {
        let mut records = self.inner.lock().await;
        if records.len() >= self.max_peers {
            return Err(ShareError::RegistryFull(self.max_peers));
        }

        let id = RecordId(records.len());
        let file_count = files.len();
        records.push(PeerRecord {
            endpoint,
            hosted_files: files,
            active: true,
        });

        info!("Registered peer {} with {} files", endpoint, file_count);
        Ok(id)
    }

    /// Endpoint of the earliest-registered active record hosting `filename`
    /// (exact, case-sensitive match).
    pub async fn find_owner(&self, filename: &str) -> Option<SocketAddr> {
        let records = self.inner.lock().await;
        records
            .iter()
            .find(|record| record.active && record.hosted_files.iter().any(|f| f == filename))
            .map(|record| record.endpoint)
    }

    /// Deactivate the first active record for `endpoint`. A no-op when no
    /// active record matches.
    pub async fn deactivate(&self, endpoint: SocketAddr) {
        let mut records = self.inner.lock().await;
        match records
            .iter_mut()
            .find(|record| record.active && record.endpoint == endpoint)
        {
            Some(record) => {
                record.active = false;
                info!("Unregistered peer {}", endpoint);
            }
            None => debug!("EXIT for unknown peer {}", endpoint),
        }
    }

    /// Every file of every active record, in registration order of peers and
    /// declaration order of files within a peer.
    pub async fn list_all(&self) -> Vec<(String, SocketAddr)> {
        let records = self.inner.lock().await;
        records
            .iter()
            .filter(|record| record.active)
            .flat_map(|record| {
                record
                    .hosted_files
                    .iter()
                    .map(|f| (f.clone(), record.endpoint))
            })
            .collect()
    }
}
