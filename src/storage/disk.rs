use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ClusterError, ClusterResult};
use crate::ring::types::{FileKey, validate_collection_id};

/// Single-directory file store backing one storage node.
///
/// Files live at `<base>/<collection-id>/<filename>`. The store knows nothing
/// about the ring or other nodes.
///
/// Writes are not atomic: a crash mid-write can leave a truncated file behind.
#[derive(Debug, Clone)]
pub struct NodeStore {
    base_dir: PathBuf,
}

impl NodeStore {
    pub fn open(base_dir: impl Into<PathBuf>) -> ClusterResult<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn collection_dir(&self, collection_id: &str) -> PathBuf {
        self.base_dir.join(collection_id)
    }

    fn file_path(&self, key: &FileKey) -> PathBuf {
        self.collection_dir(&key.collection_id).join(&key.filename)
    }

    /// Creates the collection directory if needed and overwrites the file.
    pub async fn write(&self, key: &FileKey, data: &[u8]) -> ClusterResult<()> {
        key.validate()?;

        tokio::fs::create_dir_all(self.collection_dir(&key.collection_id)).await?;
        tokio::fs::write(self.file_path(key), data).await?;

        tracing::debug!("Stored {} ({} bytes)", key, data.len());
        Ok(())
    }

    pub async fn read(&self, key: &FileKey) -> ClusterResult<Vec<u8>> {
        key.validate()?;

        tokio::fs::read(self.file_path(key))
            .await
            .map_err(|e| not_found_or_io(e, key))
    }

    /// Removes the file, then the collection directory if that left it empty.
    pub async fn delete(&self, key: &FileKey) -> ClusterResult<()> {
        key.validate()?;

        tokio::fs::remove_file(self.file_path(key))
            .await
            .map_err(|e| not_found_or_io(e, key))?;

        // Fails while other files remain, which is fine.
        if let Err(e) = tokio::fs::remove_dir(self.collection_dir(&key.collection_id)).await {
            tracing::trace!("Kept collection dir {}: {}", key.collection_id, e);
        }

        tracing::debug!("Deleted {}", key);
        Ok(())
    }

    /// Every `(collection, filename)` on this node, from a full recursive walk.
    ///
    /// Entries that are not exactly `<collection>/<file>` below the base
    /// directory cannot be addressed and are skipped.
    pub async fn list_files(&self) -> ClusterResult<Vec<FileKey>> {
        let base_dir = self.base_dir.clone();

        tokio::task::spawn_blocking(move || walk_files(&base_dir))
            .await
            .map_err(|e| ClusterError::Io(format!("listing task failed: {}", e)))?
    }

    /// Filenames stored under one collection, sorted. A missing collection is empty.
    pub async fn list_collection(&self, collection_id: &str) -> ClusterResult<Vec<String>> {
        validate_collection_id(collection_id)?;

        let mut entries = match tokio::fs::read_dir(self.collection_dir(collection_id)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut filenames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                filenames.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        filenames.sort();

        Ok(filenames)
    }
}

fn walk_files(base_dir: &Path) -> ClusterResult<Vec<FileKey>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(base_dir).min_depth(1) {
        let entry = entry.map_err(|e| ClusterError::Io(format!("walk failed: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        if entry.depth() != 2 {
            tracing::warn!("Skipping unaddressable file {}", entry.path().display());
            continue;
        }

        match addressable_key(entry.path()) {
            Some(key) => files.push(key),
            None => tracing::warn!("Skipping unaddressable file {}", entry.path().display()),
        }
    }

    files.sort();
    Ok(files)
}

/// Key of `<base>/<collection>/<file>`, if both names are UTF-8 and form a valid key.
fn addressable_key(path: &Path) -> Option<FileKey> {
    let filename = path.file_name()?.to_str()?;
    let collection_id = path.parent()?.file_name()?.to_str()?;

    let key = FileKey::new(collection_id, filename);
    key.validate().ok()?;
    Some(key)
}

fn not_found_or_io(err: std::io::Error, key: &FileKey) -> ClusterError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ClusterError::NotFound(key.canonical())
    } else {
        ClusterError::Io(format!("{}: {}", key, err))
    }
}
