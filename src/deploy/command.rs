// ABOUTME: External deployment command run inside a rendered workspace
// ABOUTME: Pulls images and brings the compose stack up, streaming output to the console

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::error::{DeployError, Result};

/// Pull, then bring the stack up and drop containers no longer in the manifest.
pub const DEFAULT_DEPLOY_SCRIPT: &str = r#"
set -e
docker compose --env-file "$ENV_FILE" pull
docker compose --env-file "$ENV_FILE" up -d --remove-orphans
"#;

/// Shell invocation used to apply a rendered project.
///
/// The script runs as `<shell> -c <script>` with the rendered manifest directory
/// as working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployCommand {
    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default = "default_script")]
    pub script: String,

    /// Extra environment variables for the script
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_script() -> String {
    DEFAULT_DEPLOY_SCRIPT.to_string()
}

impl Default for DeployCommand {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            script: default_script(),
            env: HashMap::new(),
        }
    }
}

impl DeployCommand {
    /// Run the script in `working_dir` with `vars` added to the inherited environment.
    ///
    /// Output goes straight to this process's stdout and stderr. A non-zero exit
    /// is an error carrying the exit status.
    pub async fn run(
        &self,
        project: &str,
        working_dir: &Path,
        vars: &[(&str, String)],
    ) -> Result<()> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(&self.script);
        cmd.current_dir(working_dir);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        for (key, value) in vars {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        info!("Deploying '{}' from {}", project, working_dir.display());
        debug!("Deploy script: {}", self.script.trim());

        let status = cmd.status().await.map_err(|source| DeployError::Spawn {
            shell: self.shell.clone(),
            source,
        })?;

        if !status.success() {
            error!("Deployment of '{}' exited with {}", project, status);
            return Err(DeployError::CommandFailed {
                project: project.to_string(),
                status,
            });
        }

        info!("Deployment of '{}' completed", project);
        Ok(())
    }
}
