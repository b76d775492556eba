use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use berth_schema::{ContainerId, ContainerIdentity, ContainerName, SecurityProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Existence lookup over the container IDs the store currently records.
///
/// ID allocation consults this before handing out a candidate. An `Err` means
/// the store could not answer, which is distinct from `Ok(false)`.
pub trait ContainerStore: Send + Sync {
    fn exists(&self, id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub id: ContainerId,
    pub name: ContainerName,
    pub image: String,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub security: SecurityProfile,
    pub created_at: String,
    pub updated_at: String,
    /// blake3 checksum for integrity verification. `None` for hand-written files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ContainerMetadata {
    pub fn new(id: ContainerId, name: ContainerName, image: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            name,
            image: image.into(),
            env: Vec::new(),
            security: SecurityProfile::default(),
            created_at: now.clone(),
            updated_at: now,
            checksum: None,
        }
    }

    fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        let json = serde_json::to_string_pretty(&copy)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn identity(&self) -> ContainerIdentity {
        ContainerIdentity {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

pub fn validate_container_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > 64 {
        return Err(StoreError::InvalidName(
            "container name must be 1-64 characters".to_owned(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(StoreError::InvalidName(
            "container name must match [a-zA-Z0-9_-]".to_owned(),
        ));
    }
    Ok(())
}

pub struct MetadataStore {
    layout: StoreLayout,
}

impl MetadataStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, meta: &ContainerMetadata) -> Result<(), StoreError> {
        let dest = self.layout.metadata_path(&meta.id);

        let mut meta_with_checksum = meta.clone();
        meta_with_checksum.checksum = Some(meta_with_checksum.compute_checksum()?);
        let content = serde_json::to_string_pretty(&meta_with_checksum)?;

        let dir = self.layout.metadata_dir();
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<ContainerMetadata, StoreError> {
        let path = self.layout.metadata_path(id);
        if !path.exists() {
            return Err(StoreError::ContainerNotFound(id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        let meta: ContainerMetadata = serde_json::from_str(&content)?;

        if let Some(ref expected) = meta.checksum {
            let actual = meta.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    id: id.to_owned(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(meta)
    }

    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let path = self.layout.metadata_path(id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<ContainerMetadata>, StoreError> {
        let dir = self.layout.metadata_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_str().unwrap_or("");
            if name_str.starts_with('.') {
                continue;
            }
            match self.get(name_str) {
                Ok(meta) => results.push(meta),
                Err(e) => {
                    tracing::warn!("skipping corrupted metadata entry '{name_str}': {e}");
                }
            }
        }
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(results)
    }
}

impl ContainerStore for MetadataStore {
    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.layout.metadata_path(id).try_exists()?)
    }
}
