// ABOUTME: Container runtime capability used by the registry and lifecycle operations
// ABOUTME: Defines the runtime trait and the container summary it reports

pub mod docker;
pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub use docker::DockerRuntime;
pub use error::{Result, RuntimeError};

/// One container as reported by the runtime's list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeContainer {
    pub names: Vec<String>,
    pub id: String,
    pub image: String,
    pub image_id: String,
    pub command: String,
    pub created: i64,
    pub labels: HashMap<String, String>,
    pub state: String,
    pub status: String,
    pub size_rw: Option<i64>,
    pub size_root_fs: Option<i64>,
    pub network_mode: Option<String>,
    pub annotations: HashMap<String, String>,
}

impl RuntimeContainer {
    /// First declared name without the leading `/` the engine API adds.
    pub fn primary_name(&self) -> Option<&str> {
        self.names
            .first()
            .map(|name| name.trim_start_matches('/'))
            .filter(|name| !name.is_empty())
    }
}

/// What the core needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List containers; `all` includes stopped ones.
    async fn list_containers(&self, all: bool) -> Result<Vec<RuntimeContainer>>;

    async fn start(&self, id: &str) -> Result<()>;

    /// Stop a container, waiting up to `timeout` before the runtime kills it.
    async fn stop(&self, id: &str, timeout: Duration) -> Result<()>;

    /// Current state string (`running`, `exited`, ...) of the named container.
    async fn inspect_status(&self, name: &str) -> Result<String>;
}
