use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

use crate::utils::{Result, ShareError};

/// The directory a peer shares files from. Only plain file names resolve;
/// anything carrying a path separator or `..` is treated as missing, so a
/// download request cannot escape the store root.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`. Fails if the directory cannot be
    /// read, so an unusable store is caught at startup.
    pub async fn open(root: PathBuf) -> Result<Self> {
        fs::read_dir(&root)
            .await
            .map_err(|e| ShareError::IoError(format!("Failed to open store {:?}: {}", root, e)))?;

        info!("Sharing files from {:?}", root);
        Ok(Self { root })
    }

    /// Names of the regular files directly under the store root, in
    /// directory order. Subdirectories and special files are skipped.
    pub async fn scan(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ShareError::IoError(format!("Failed to read store: {}", e)))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShareError::IoError(format!("Failed to read store entry: {}", e)))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ShareError::IoError(format!("Failed to stat store entry: {}", e)))?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        debug!("Store scan found {} files", names.len());
        Ok(names)
    }

    /// Open a hosted file by name.
    pub async fn open_file(&self, name: &str) -> Result<File> {
        if !Self::is_plain_name(name) {
            return Err(ShareError::FileNotFound(name.to_string()));
        }

        File::open(self.root.join(name))
            .await
            .map_err(|_| ShareError::FileNotFound(name.to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_plain_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.contains('\\')
    }
}
