use crate::models::{PermissionStatus, Resource};
use crate::platform::PermissionPlatform;
use anyhow::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Record of previous permission denials, keyed by resource.
///
/// The workflow consults it to decide whether a prompt is worthwhile; it is
/// advisory and never blocks a caller that chooses to prompt anyway.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionMemory: Send + Sync {
    fn was_denied(&self, resource: Resource) -> bool;

    fn record_denial(&self, resource: Resource) -> Result<()>;

    fn clear(&self, resource: Resource) -> Result<()>;
}

/// Process-lifetime [`PermissionMemory`].
#[derive(Debug, Default)]
pub struct InMemoryPermissionMemory {
    denied: Mutex<HashSet<Resource>>,
}

impl InMemoryPermissionMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PermissionMemory for InMemoryPermissionMemory {
    fn was_denied(&self, resource: Resource) -> bool {
        self.denied.lock().unwrap().contains(&resource)
    }

    fn record_denial(&self, resource: Resource) -> Result<()> {
        self.denied.lock().unwrap().insert(resource);
        Ok(())
    }

    fn clear(&self, resource: Resource) -> Result<()> {
        self.denied.lock().unwrap().remove(&resource);
        Ok(())
    }
}

/// Queries and requests camera and library authorization.
pub struct PermissionGateway<P> {
    platform: P,
    memory: Arc<dyn PermissionMemory>,
}

impl<P: PermissionPlatform> PermissionGateway<P> {
    pub fn new(platform: P, memory: Arc<dyn PermissionMemory>) -> Self {
        Self { platform, memory }
    }

    /// Current status, or `None` when the platform reports a value outside
    /// the recognized set.
    pub fn status(&self, resource: Resource) -> Option<PermissionStatus> {
        let raw = self.platform.authorization_status(resource);
        let status = PermissionStatus::from_platform(raw);
        if status.is_none() {
            tracing::warn!("Unrecognized {} authorization: {:?}", resource, raw);
        }
        status
    }

    /// Prompt for `resource` if it is still undetermined.
    ///
    /// An already determined status is returned without prompting again. A
    /// denial is written to the permission memory.
    pub async fn request(&self, resource: Resource) -> Option<PermissionStatus> {
        let current = self.status(resource);
        match current {
            Some(status) if !status.is_determined() => {}
            _ => {
                tracing::debug!("Not prompting for {}: already {:?}", resource, current);
                return current;
            }
        }

        tracing::info!("Requesting {} permission", resource);
        let raw = self.platform.request_authorization(resource).await;
        let status = PermissionStatus::from_platform(raw);

        match status {
            Some(PermissionStatus::Granted) => {
                tracing::info!("{} permission granted", resource);
            }
            Some(PermissionStatus::Denied) => {
                tracing::info!("{} permission denied", resource);
                self.record_denial(resource);
            }
            Some(PermissionStatus::Undetermined) | None => {
                tracing::warn!("{} prompt resolved without a decision: {:?}", resource, raw);
            }
        }

        status
    }

    pub fn was_previously_denied(&self, resource: Resource) -> bool {
        self.memory.was_denied(resource)
    }

    /// Persist a denial. Storage failures are logged and otherwise ignored.
    pub fn record_denial(&self, resource: Resource) {
        if let Err(e) = self.memory.record_denial(resource) {
            tracing::warn!("Failed to remember {} denial: {:#}", resource, e);
        }
    }
}
