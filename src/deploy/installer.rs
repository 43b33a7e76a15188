// ABOUTME: Install orchestrator turning a project's template tree into a running deployment
// ABOUTME: Renders into a fresh workspace, runs the deploy command there, then removes the workspace

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::command::DeployCommand;
use super::error::{DeployError, Result};
use super::workspace::Workspace;
use crate::project::layout::find_compose_dir;
use crate::registry::Registry;
use crate::template::{RenderSummary, TemplateRenderer};

/// Where and how deployments run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploySettings {
    /// Passed to the deploy script as `ENV_FILE`
    pub environment_file: PathBuf,

    /// Passed to the deploy script as `DOCKER_HOST`; empty means the local engine
    pub docker_host: String,

    /// Parent for workspaces; the system temp dir when unset
    pub workspace_dir: Option<PathBuf>,

    pub command: DeployCommand,
}

pub struct Installer {
    registry: Arc<Registry>,
    renderer: TemplateRenderer,
    settings: DeploySettings,
}

impl Installer {
    pub fn new(registry: Arc<Registry>, settings: DeploySettings) -> Self {
        Self {
            registry,
            renderer: TemplateRenderer::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    /// Install or update `name`.
    ///
    /// Holds the project's lock for the whole transaction. The workspace is
    /// removed before returning whether rendering or the deploy command failed
    /// or not. Nothing already applied by the deploy command is rolled back.
    pub async fn install(&self, name: &str) -> Result<RenderSummary> {
        let _guard = self
            .registry
            .lock_project(name)
            .await
            .map_err(|source| DeployError::Lock {
                project: name.to_string(),
                source,
            })?;

        let template_dir = match self.registry.template_dir(name).await {
            None => return Err(DeployError::UnknownProject(name.to_string())),
            Some(None) => return Err(DeployError::NoTemplate(name.to_string())),
            Some(Some(dir)) => dir,
        };

        info!("Installing '{}' from {}", name, template_dir.display());

        let workspace = Workspace::create(self.settings.workspace_dir.as_deref(), name)?;
        let result = self.deploy_into(name, &template_dir, &workspace).await;
        workspace.close();

        if let Err(ref e) = result {
            warn!("Install of '{}' failed: {}", name, e);
        }

        result
    }

    async fn deploy_into(
        &self,
        name: &str,
        template_dir: &Path,
        workspace: &Workspace,
    ) -> Result<RenderSummary> {
        let summary = self.render(template_dir, workspace.project_dir()).await?;

        let compose_dir = find_compose_dir(workspace.project_dir())
            .ok_or_else(|| DeployError::NoComposeFile(template_dir.to_path_buf()))?;

        let vars = self.command_env(name);
        self.settings.command.run(name, &compose_dir, &vars).await?;

        Ok(summary)
    }

    async fn render(&self, template_dir: &Path, output_dir: &Path) -> Result<RenderSummary> {
        let renderer = self.renderer.clone();
        let template_dir = template_dir.to_path_buf();
        let output_dir = output_dir.to_path_buf();

        let summary =
            tokio::task::spawn_blocking(move || renderer.render_dir(&template_dir, &output_dir))
                .await??;

        Ok(summary)
    }

    fn command_env(&self, name: &str) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            (
                "ENV_FILE",
                self.settings.environment_file.to_string_lossy().to_string(),
            ),
            // keeps the compose project name stable regardless of directory layout
            ("COMPOSE_PROJECT_NAME", name.to_string()),
        ];

        if !self.settings.docker_host.is_empty() {
            vars.push(("DOCKER_HOST", self.settings.docker_host.clone()));
        }

        vars
    }
}
