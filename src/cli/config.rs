// ABOUTME: Configuration management for the stevedore application
// ABOUTME: Handles loading configuration from YAML files, defaults, and environment overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::deploy::{DeployCommand, DeploySettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root scanned for compose projects
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Destination for the standalone render commands
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Environment file handed to `docker compose --env-file`
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Remote engine address; empty uses the local docker engine
    #[serde(default)]
    pub docker_host: String,

    /// Parent directory for install workspaces
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,

    /// Directory for per-project lock files shared by concurrent invocations
    #[serde(default)]
    pub lock_dir: Option<PathBuf>,

    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,

    #[serde(default)]
    pub deploy: DeployCommand,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("/compose-templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/tmp/compose-output")
}

fn default_env_file() -> PathBuf {
    PathBuf::from("/environment")
}

fn default_stop_timeout_secs() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            output_dir: default_output_dir(),
            env_file: default_env_file(),
            docker_host: String::new(),
            workspace_dir: None,
            lock_dir: None,
            stop_timeout_secs: default_stop_timeout_secs(),
            deploy: DeployCommand::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            if contents.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml::from_str(&contents)?
            }
        } else {
            Config::default()
        };

        config.merge_env()?;

        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            PathBuf::from("config.yml"),
            PathBuf::from("stevedore.yml"),
            PathBuf::from("stevedore.yaml"),
            PathBuf::from(".stevedore.yml"),
        ];

        // Check current directory
        if let Some(path) = possible_paths.iter().find(|path| path.exists()) {
            return path.clone();
        }

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".stevedore").join("config.yml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Return default path (may not exist)
        PathBuf::from("stevedore.yml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("STEVEDORE_TEMPLATE_DIR") {
            self.template_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("STEVEDORE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("STEVEDORE_ENV_FILE") {
            self.env_file = PathBuf::from(file);
        }
        if let Ok(host) = std::env::var("STEVEDORE_DOCKER_HOST") {
            self.docker_host = host;
        }
        if let Ok(dir) = std::env::var("STEVEDORE_WORKSPACE_DIR") {
            self.workspace_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var("STEVEDORE_LOCK_DIR") {
            self.lock_dir = Some(PathBuf::from(dir));
        }
        if let Ok(timeout) = std::env::var("STEVEDORE_STOP_TIMEOUT") {
            self.stop_timeout_secs = timeout.parse()?;
        }

        // Logging configuration
        if let Ok(level) = std::env::var("STEVEDORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("STEVEDORE_LOG_FORMAT") {
            self.logging.format = format;
        }

        if self.docker_host.is_empty() {
            debug!("docker_host not set, using local docker");
        }

        Ok(())
    }

    pub fn uses_remote_docker(&self) -> bool {
        !self.docker_host.is_empty()
    }

    /// Where project lock files live: `lock_dir`, else `stevedore-locks` under
    /// the workspace directory or the system temp dir.
    pub fn lock_dir(&self) -> PathBuf {
        match (&self.lock_dir, &self.workspace_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(workspaces)) => workspaces.join("stevedore-locks"),
            (None, None) => std::env::temp_dir().join("stevedore-locks"),
        }
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn deploy_settings(&self) -> DeploySettings {
        DeploySettings {
            environment_file: self.env_file.clone(),
            docker_host: self.docker_host.clone(),
            workspace_dir: self.workspace_dir.clone(),
            command: self.deploy.clone(),
        }
    }
}
