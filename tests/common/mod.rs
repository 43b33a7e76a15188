// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a fake container runtime and builders for template project trees

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

use stevedore::runtime::{ContainerRuntime, Result, RuntimeContainer, RuntimeError};

/// A runtime call recorded by [`FakeRuntime`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    List,
    Start(String),
    Stop(String, Duration),
    Inspect(String),
}

/// In-memory runtime that flips container states and records every call.
#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<Vec<RuntimeContainer>>,
    calls: Mutex<Vec<RuntimeCall>>,
    event_log: Option<PathBuf>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, name: &str, id: &str, state: &str) -> Self {
        self.containers.lock().unwrap().push(RuntimeContainer {
            names: vec![format!("/{}", name)],
            id: id.to_string(),
            image: format!("{}:latest", name),
            state: state.to_string(),
            status: state.to_string(),
            ..Default::default()
        });
        self
    }

    /// Append `runtime-start` / `runtime-stop` lines to `path` as actions happen.
    pub fn with_event_log(mut self, path: &Path) -> Self {
        self.event_log = Some(path.to_path_buf());
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn state_of(&self, name: &str) -> Option<String> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.primary_name() == Some(name))
            .map(|c| c.state.clone())
    }

    fn log_event(&self, event: &str) {
        if let Some(path) = &self.event_log {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .unwrap();
            writeln!(file, "{}", event).unwrap();
        }
    }

    fn set_state_by_id(&self, id: &str, state: &str) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RuntimeError::Api(format!("no such container: {}", id)))?;
        container.state = state.to_string();
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self, _all: bool) -> Result<Vec<RuntimeContainer>> {
        self.calls.lock().unwrap().push(RuntimeCall::List);
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RuntimeCall::Start(id.to_string()));
        self.log_event("runtime-start");
        self.set_state_by_id(id, "running")
    }

    async fn stop(&self, id: &str, timeout: Duration) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RuntimeCall::Stop(id.to_string(), timeout));
        self.log_event("runtime-stop");
        self.set_state_by_id(id, "exited")
    }

    async fn inspect_status(&self, name: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(RuntimeCall::Inspect(name.to_string()));
        self.state_of(name)
            .ok_or_else(|| RuntimeError::Api(format!("no such container: {}", name)))
    }
}

/// Builds a template root with one directory per project.
pub struct TemplateTree {
    pub temp_dir: TempDir,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `<root>/<name>/values.yml` plus `<root>/<name>/templates/compose.yml`.
    pub fn add_project(&self, name: &str, values: &str, compose: &str) -> PathBuf {
        let project = self.root().join(name);
        self.write(&project.join("values.yml"), values);
        self.write(&project.join("templates").join("compose.yml"), compose);
        project
    }

    pub fn add_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        self.write(&path, contents);
        path
    }

    fn write(&self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// Relative path -> contents for every file under `dir`.
pub fn read_tree(dir: &Path) -> HashMap<PathBuf, String> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            let contents = fs::read_to_string(entry.path()).unwrap();
            (relative, contents)
        })
        .collect()
}
