// ABOUTME: Registry record combining a declared project with its live container fields
// ABOUTME: Records may be declared-only, observed-only (orphans), or both

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::project::TemplateProject;
use crate::runtime::RuntimeContainer;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub name: String,
    /// Project template directory; `None` for containers this tool did not declare.
    pub template_dir: Option<PathBuf>,
    pub id: String,
    pub image: String,
    pub image_id: String,
    pub command: String,
    pub created: i64,
    pub labels: HashMap<String, String>,
    pub state: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_rw: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_root_fs: Option<i64>,
    pub host_config: HostConfig,
}

impl ContainerRecord {
    /// A project that is declared on disk but not yet observed running.
    pub fn declared(project: &TemplateProject) -> Self {
        Self {
            name: project.name().to_string(),
            template_dir: Some(project.template_dir().to_path_buf()),
            ..Default::default()
        }
    }

    /// A live container with no matching template directory.
    pub fn orphan(name: &str, container: &RuntimeContainer) -> Self {
        let mut record = Self {
            name: name.to_string(),
            ..Default::default()
        };
        record.apply_runtime(container);
        record
    }

    /// Overwrite the live fields from a runtime summary, keeping name and template.
    pub fn apply_runtime(&mut self, container: &RuntimeContainer) {
        self.id = container.id.clone();
        self.image = container.image.clone();
        self.image_id = container.image_id.clone();
        self.command = container.command.clone();
        self.created = container.created;
        self.labels = container.labels.clone();
        self.state = container.state.clone();
        self.status = container.status.clone();
        self.size_rw = container.size_rw;
        self.size_root_fs = container.size_root_fs;
        self.host_config = HostConfig {
            network_mode: container.network_mode.clone(),
            annotations: container.annotations.clone(),
        };
    }

    pub fn is_orphan(&self) -> bool {
        self.template_dir.is_none()
    }

    /// True once the runtime has reported this container.
    pub fn is_observed(&self) -> bool {
        !self.id.is_empty()
    }
}
