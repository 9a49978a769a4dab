use crate::models::Resource;
use crate::services::PermissionMemory;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use std::sync::Mutex;

/// [`PermissionMemory`] persisted as a YAML map of flag name to bool.
///
/// ```yaml
/// CameraPermissionDenied: true
/// PhotoPermissionDenied: false
/// ```
#[derive(Debug)]
pub struct FilePermissionMemory {
    path: Utf8PathBuf,
    flags: Mutex<IndexMap<String, bool>>,
}

impl FilePermissionMemory {
    /// Load the flags at `path`; a missing file means nothing was denied.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let flags = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read permission memory: {}", path))?;
            serde_yaml_ng::from_str(&contents)
                .with_context(|| format!("Failed to parse permission memory: {}", path))?
        } else {
            IndexMap::new()
        };

        tracing::debug!("Permission memory loaded from {}: {:?}", path, flags);
        Ok(Self {
            path: path.to_path_buf(),
            flags: Mutex::new(flags),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn set_flag(&self, resource: Resource, denied: bool) -> Result<()> {
        let mut flags = self.flags.lock().unwrap();
        let mut updated = flags.clone();
        updated.insert(resource.denial_key().to_string(), denied);

        let yaml_string = serde_yaml_ng::to_string(&updated)
            .context("Failed to serialize permission memory to YAML")?;
        fs::write(&self.path, yaml_string)
            .with_context(|| format!("Failed to write permission memory: {}", self.path))?;

        // Only flags that reached the disk are visible to readers
        *flags = updated;
        tracing::debug!("Saved {}={} to {}", resource.denial_key(), denied, self.path);
        Ok(())
    }
}

impl PermissionMemory for FilePermissionMemory {
    fn was_denied(&self, resource: Resource) -> bool {
        self.flags
            .lock()
            .unwrap()
            .get(resource.denial_key())
            .copied()
            .unwrap_or(false)
    }

    fn record_denial(&self, resource: Resource) -> Result<()> {
        self.set_flag(resource, true)
    }

    fn clear(&self, resource: Resource) -> Result<()> {
        self.set_flag(resource, false)
    }
}
