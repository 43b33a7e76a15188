// ABOUTME: Project registry merging declared projects with live runtime state
// ABOUTME: Shared by handle across operations, with per-project locks for state-changing work

pub mod locks;
pub mod record;

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use locks::{ProjectGuard, ProjectLocks};
pub use record::{ContainerRecord, HostConfig};

use crate::project::ProjectMap;
use crate::runtime::{self, ContainerRuntime, RuntimeContainer};

/// Outcome of merging a live container list into the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Live containers matched to an existing record.
    pub matched: usize,
    /// Live containers with no declared project.
    pub orphans: usize,
    /// Live containers skipped because they carry no name.
    pub unnamed: usize,
}

/// Name-keyed map of every known project and container.
///
/// Records are only ever replaced whole: writers clone the current record,
/// mutate the clone and store it back, so readers never observe a half update.
#[derive(Debug, Default)]
pub struct Registry {
    records: RwLock<HashMap<String, ContainerRecord>>,
    locks: ProjectLocks,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with declared-but-unobserved records.
    pub fn from_projects(projects: &ProjectMap) -> Self {
        let records = projects
            .values()
            .map(|project| (project.name().to_string(), ContainerRecord::declared(project)))
            .collect();

        Self {
            records: RwLock::new(records),
            locks: ProjectLocks::new(),
        }
    }

    /// Merge a live container list into the registry.
    ///
    /// Known names get their runtime fields overwritten while keeping the
    /// template directory. Unknown names become orphan records. Declared records
    /// absent from `live` are left as they are. Running this twice with the same
    /// list leaves the registry unchanged the second time.
    pub async fn reconcile(&self, live: &[RuntimeContainer]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut records = self.records.write().await;

        for container in live {
            let name = match container.primary_name() {
                Some(name) => name,
                None => {
                    debug!("Skipping unnamed container {}", container.id);
                    report.unnamed += 1;
                    continue;
                }
            };

            match records.get(name) {
                Some(existing) => {
                    let mut updated = existing.clone();
                    updated.apply_runtime(container);
                    records.insert(name.to_string(), updated);
                    report.matched += 1;
                }
                None => {
                    debug!("Container '{}' has no template directory", name);
                    records.insert(name.to_string(), ContainerRecord::orphan(name, container));
                    report.orphans += 1;
                }
            }
        }

        info!(
            "Reconciled {} live containers ({} matched, {} orphaned)",
            live.len(),
            report.matched,
            report.orphans
        );

        report
    }

    /// List every container from the runtime and merge it in.
    ///
    /// On a runtime error nothing is changed and live fields stay as they were.
    pub async fn sync(&self, runtime: &dyn ContainerRuntime) -> runtime::Result<ReconcileReport> {
        let live = runtime.list_containers(true).await?;
        Ok(self.reconcile(&live).await)
    }

    pub async fn get(&self, name: &str) -> Option<ContainerRecord> {
        self.records.read().await.get(name).cloned()
    }

    /// Template directory for `name`: `None` if unknown, `Some(None)` for orphans.
    pub async fn template_dir(&self, name: &str) -> Option<Option<PathBuf>> {
        self.records
            .read()
            .await
            .get(name)
            .map(|record| record.template_dir.clone())
    }

    /// All records sorted by name.
    pub async fn snapshot(&self) -> Vec<ContainerRecord> {
        let mut records: Vec<ContainerRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Serialize operations on `name`; hold the guard for the whole operation.
    pub async fn lock_project(&self, name: &str) -> std::io::Result<ProjectGuard> {
        self.locks.acquire(name).await
    }

    /// Make project locks visible to other processes through lock files in `dir`.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.locks = self.locks.with_lock_dir(dir);
        self
    }

    /// Replace only the `state` of an existing record. Returns false for unknown names.
    pub async fn set_state(&self, name: &str, state: &str) -> bool {
        let mut records = self.records.write().await;
        match records.get(name) {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.state = state.to_string();
                records.insert(name.to_string(), updated);
                true
            }
            None => false,
        }
    }

    /// Ask the runtime for the current state of `name` and store it.
    ///
    /// Only `state` changes; id and image keep whatever the last full merge saw.
    /// Callers that mutate the project hold its guard while calling this.
    pub async fn refresh_state(
        &self,
        name: &str,
        runtime: &dyn ContainerRuntime,
    ) -> runtime::Result<String> {
        let state = runtime.inspect_status(name).await?;
        if self.set_state(name, &state).await {
            debug!("State of '{}' is now {}", name, state);
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::TemplateProject;

    fn container(name: &str, id: &str, state: &str) -> RuntimeContainer {
        RuntimeContainer {
            names: vec![format!("/{}", name)],
            id: id.to_string(),
            image: format!("{}:latest", name),
            state: state.to_string(),
            ..Default::default()
        }
    }

    fn projects(names: &[&str]) -> ProjectMap {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    TemplateProject::new(*name, format!("/templates/{}", name)),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_reconcile_updates_declared_record() {
        let registry = Registry::from_projects(&projects(&["api"]));

        let report = registry
            .reconcile(&[container("api", "abc123", "running")])
            .await;

        assert_eq!(report.matched, 1);
        let record = registry.get("api").await.unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.image, "api:latest");
        assert_eq!(record.state, "running");
        assert_eq!(record.template_dir, Some(PathBuf::from("/templates/api")));
    }

    #[tokio::test]
    async fn test_reconcile_inserts_orphan() {
        let registry = Registry::from_projects(&projects(&["api"]));

        let report = registry
            .reconcile(&[container("redis", "def456", "exited")])
            .await;

        assert_eq!(report.orphans, 1);
        let orphan = registry.get("redis").await.unwrap();
        assert!(orphan.is_orphan());
        assert_eq!(orphan.state, "exited");

        let declared = registry.get("api").await.unwrap();
        assert!(!declared.is_observed());
    }

    #[tokio::test]
    async fn test_reconcile_skips_unnamed() {
        let registry = Registry::new();
        let report = registry
            .reconcile(&[RuntimeContainer {
                id: "x".to_string(),
                ..Default::default()
            }])
            .await;

        assert_eq!(report.unnamed, 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_state_only_touches_known_records() {
        let registry = Registry::from_projects(&projects(&["api"]));
        registry
            .reconcile(&[container("api", "abc123", "running")])
            .await;

        assert!(registry.set_state("api", "exited").await);
        assert!(!registry.set_state("ghost", "exited").await);

        let record = registry.get("api").await.unwrap();
        assert_eq!(record.state, "exited");
        assert_eq!(record.id, "abc123");
        assert!(registry.get("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted() {
        let registry = Registry::from_projects(&projects(&["web", "api", "db"]));
        let names: Vec<String> = registry
            .snapshot()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["api", "db", "web"]);
    }
}
