// ABOUTME: Start, stop, and restart operations for deployed project containers
// ABOUTME: Each action refreshes the container's state in the registry afterwards

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::error::{DeployError, Result};
use crate::registry::{ProjectGuard, Registry};
use crate::runtime::ContainerRuntime;

/// Grace period the runtime gives a container before killing it on stop.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(20);

pub struct Lifecycle {
    registry: Arc<Registry>,
    runtime: Arc<dyn ContainerRuntime>,
    stop_timeout: Duration,
}

impl Lifecycle {
    pub fn new(registry: Arc<Registry>, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            registry,
            runtime,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Start the container named `name`; returns its refreshed state.
    pub async fn start(&self, name: &str) -> Result<String> {
        let _guard = self.lock(name).await?;
        let id = self.find_container_id(name).await?;

        info!("Starting {}", name);
        self.runtime.start(&id).await?;

        self.refresh(name).await
    }

    /// Stop the container named `name`; returns its refreshed state.
    pub async fn stop(&self, name: &str) -> Result<String> {
        let _guard = self.lock(name).await?;
        let id = self.find_container_id(name).await?;

        info!("Stopping {}", name);
        self.runtime.stop(&id, self.stop_timeout).await?;

        self.refresh(name).await
    }

    /// Stop then start the container named `name` as one serialized operation.
    pub async fn restart(&self, name: &str) -> Result<String> {
        let _guard = self.lock(name).await?;
        let id = self.find_container_id(name).await?;

        info!("Restarting {}", name);
        self.runtime.stop(&id, self.stop_timeout).await?;
        self.runtime.start(&id).await?;

        self.refresh(name).await
    }

    async fn lock(&self, name: &str) -> Result<ProjectGuard> {
        self.registry
            .lock_project(name)
            .await
            .map_err(|source| DeployError::Lock {
                project: name.to_string(),
                source,
            })
    }

    async fn refresh(&self, name: &str) -> Result<String> {
        Ok(self
            .registry
            .refresh_state(name, self.runtime.as_ref())
            .await?)
    }

    async fn find_container_id(&self, name: &str) -> Result<String> {
        let containers = self.runtime.list_containers(true).await?;

        containers
            .into_iter()
            .filter(|container| container.primary_name() == Some(name))
            .map(|container| container.id)
            .last()
            .ok_or_else(|| DeployError::ContainerNotFound(name.to_string()))
    }
}
