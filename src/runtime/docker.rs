// ABOUTME: Docker Engine implementation of the container runtime capability
// ABOUTME: Talks to the local socket by default or to a configured unix/tcp docker host

use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary;
use bollard::{Docker, API_DEFAULT_VERSION};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::error::{Result, RuntimeError};
use super::{ContainerRuntime, RuntimeContainer};

const CONNECT_TIMEOUT_SECS: u64 = 120;

pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connect to `docker_host`, or to the local engine when it is empty.
    pub fn connect(docker_host: &str) -> Result<Self> {
        let connected = if docker_host.is_empty() {
            info!("Connecting to local docker engine");
            Docker::connect_with_local_defaults()
        } else if let Some(path) = docker_host.strip_prefix("unix://") {
            info!("Connecting to docker engine at {}", docker_host);
            Docker::connect_with_unix(path, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
        } else if docker_host.starts_with("tcp://") || docker_host.starts_with("http://") {
            info!("Connecting to docker engine at {}", docker_host);
            Docker::connect_with_http(docker_host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
        } else {
            return Err(RuntimeError::UnsupportedHost(docker_host.to_string()));
        };

        let client = connected.map_err(|e| RuntimeError::Connection {
            host: if docker_host.is_empty() {
                "local".to_string()
            } else {
                docker_host.to_string()
            },
            message: e.to_string(),
        })?;

        Ok(Self { client })
    }
}

impl From<ContainerSummary> for RuntimeContainer {
    fn from(summary: ContainerSummary) -> Self {
        Self {
            names: summary.names.unwrap_or_default(),
            id: summary.id.unwrap_or_default(),
            image: summary.image.unwrap_or_default(),
            image_id: summary.image_id.unwrap_or_default(),
            command: summary.command.unwrap_or_default(),
            created: summary.created.unwrap_or_default(),
            labels: summary.labels.unwrap_or_default(),
            state: summary.state.unwrap_or_default(),
            status: summary.status.unwrap_or_default(),
            size_rw: summary.size_rw,
            size_root_fs: summary.size_root_fs,
            network_mode: summary.host_config.and_then(|config| config.network_mode),
            annotations: HashMap::new(),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self, all: bool) -> Result<Vec<RuntimeContainer>> {
        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await?;
        debug!("Runtime reported {} containers", containers.len());

        Ok(containers.into_iter().map(RuntimeContainer::from).collect())
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.client
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop(&self, id: &str, timeout: Duration) -> Result<()> {
        let options = StopContainerOptions {
            t: timeout.as_secs() as i64,
        };
        self.client.stop_container(id, Some(options)).await?;
        Ok(())
    }

    async fn inspect_status(&self, name: &str) -> Result<String> {
        let details = self
            .client
            .inspect_container(name, None::<InspectContainerOptions>)
            .await?;

        details
            .state
            .and_then(|state| state.status)
            .map(|status| status.to_string())
            .ok_or_else(|| RuntimeError::MissingStatus(name.to_string()))
    }
}
