use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClusterError, ClusterResult};

/// Address of a stored file: the collection it belongs to and its name inside it.
///
/// Hashed through its canonical form `"<collection-id>/<filename>"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey {
    pub collection_id: String,
    pub filename: String,
}

impl FileKey {
    pub fn new(collection_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            filename: filename.into(),
        }
    }

    pub fn canonical(&self) -> String {
        format!("{}/{}", self.collection_id, self.filename)
    }

    /// Rejects keys that cannot map onto a single `<base>/<collection>/<file>` path.
    pub fn validate(&self) -> ClusterResult<()> {
        validate_component("collection id", &self.collection_id)?;
        validate_component("filename", &self.filename)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection_id, self.filename)
    }
}

/// Checks a bare collection id, for calls that address a whole collection.
pub fn validate_collection_id(collection_id: &str) -> ClusterResult<()> {
    validate_component("collection id", collection_id)
}

fn validate_component(kind: &str, value: &str) -> ClusterResult<()> {
    if value.is_empty() {
        return Err(ClusterError::InvalidKey(format!("{} is empty", kind)));
    }
    if value == "." || value == ".." {
        return Err(ClusterError::InvalidKey(format!("{} {:?} is reserved", kind, value)));
    }
    if value.contains(&['/', '\\', '\0'][..]) {
        return Err(ClusterError::InvalidKey(format!(
            "{} {:?} contains a path separator",
            kind, value
        )));
    }
    Ok(())
}

/// Trims a node address and rejects empty ones.
pub fn normalize_address(address: &str) -> ClusterResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ClusterError::InvalidKey("node address is empty".to_string()));
    }
    Ok(trimmed.to_string())
}
