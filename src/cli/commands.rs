// ABOUTME: Command implementations for the stevedore CLI
// ABOUTME: Wires scanning, reconciliation, rendering, install, and lifecycle actions to output

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use crate::deploy::{Installer, Lifecycle};
use crate::project::scan_projects;
use crate::registry::{ContainerRecord, Registry};
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::template::TemplateRenderer;

/// Lifecycle action requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
}

/// Scan the template directory into a registry of declared projects.
fn declared_registry(config: &Config) -> Result<Arc<Registry>> {
    let projects = scan_projects(&config.template_dir).with_context(|| {
        format!(
            "Failed to scan template directory {}",
            config.template_dir.display()
        )
    })?;

    Ok(Arc::new(
        Registry::from_projects(&projects).with_lock_dir(config.lock_dir()),
    ))
}

/// Scan the template directory, connect to the runtime and merge live state.
async fn load_registry(config: &Config) -> Result<(Arc<Registry>, Arc<dyn ContainerRuntime>)> {
    let registry = declared_registry(config)?;

    let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerRuntime::connect(&config.docker_host)?);
    registry
        .sync(runtime.as_ref())
        .await
        .context("Failed to list containers")?;

    Ok((registry, runtime))
}

/// Print the merged project listing
///
/// When the runtime cannot be reached the declared projects are still listed,
/// without live fields.
pub async fn list_projects(json: bool, config: &Config) -> Result<()> {
    let registry = declared_registry(config)?;

    match DockerRuntime::connect(&config.docker_host) {
        Ok(runtime) => {
            if let Err(e) = registry.sync(&runtime).await {
                warn!("Container runtime unavailable, live state not shown: {}", e);
            }
        }
        Err(e) => warn!("Container runtime unavailable, live state not shown: {}", e),
    }

    print_registry(&registry, json).await
}

/// Print projects found on disk without contacting the runtime
pub async fn scan(config: &Config) -> Result<()> {
    let projects = scan_projects(&config.template_dir)?;

    for project in projects.values() {
        println!("{}\t{}", project.name(), project.template_dir().display());
    }

    info!("Found {} projects", projects.len());
    Ok(())
}

/// Install or update a project, then print the listing
pub async fn install(name: String, config: &Config) -> Result<()> {
    let (registry, runtime) = load_registry(config).await?;

    let installer = Installer::new(Arc::clone(&registry), config.deploy_settings());
    let summary = installer.install(&name).await?;
    info!(
        "Installed '{}' ({} manifests rendered, {} files copied)",
        name, summary.rendered, summary.copied
    );

    // the stack may have created or replaced containers
    registry.sync(runtime.as_ref()).await?;

    print_registry(&registry, false).await
}

/// Start, stop, or restart a project's container, then print the listing
pub async fn lifecycle(action: Action, name: String, config: &Config) -> Result<()> {
    let (registry, runtime) = load_registry(config).await?;

    let lifecycle = Lifecycle::new(Arc::clone(&registry), runtime)
        .with_stop_timeout(config.stop_timeout());

    let state = match action {
        Action::Start => lifecycle.start(&name).await?,
        Action::Stop => lifecycle.stop(&name).await?,
        Action::Restart => lifecycle.restart(&name).await?,
    };
    info!("'{}' is {}", name, state);

    print_registry(&registry, false).await
}

/// Render every file of a template directory
pub async fn render_dir(dir: PathBuf, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    info!("Processing directory `{}`", dir.display());

    let summary = TemplateRenderer::new().render_dir(&dir, &output_dir)?;

    println!(
        "Rendered {} manifests and copied {} files to {}",
        summary.rendered,
        summary.copied,
        output_dir.display()
    );
    Ok(())
}

/// Render a single manifest into the output directory
pub async fn render_file(file: PathBuf, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    info!("Processing file `{}`", file.display());

    let file_name = file
        .file_name()
        .with_context(|| format!("Not a file path: {}", file.display()))?;
    let output_path = output_dir.join(file_name);

    TemplateRenderer::new().render_file(&file, &output_path)?;

    println!("Output written to {}", output_path.display());
    Ok(())
}

async fn print_registry(registry: &Registry, json: bool) -> Result<()> {
    let records = registry.snapshot().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", format_registry(&records));
    }

    Ok(())
}

/// Render records as an aligned text table
pub fn format_registry(records: &[ContainerRecord]) -> String {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|record| {
            [
                record.name.clone(),
                if record.is_observed() {
                    record.state.clone()
                } else {
                    "not installed".to_string()
                },
                record.image.clone(),
                record
                    .template_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let header = [
        "NAME".to_string(),
        "STATE".to_string(),
        "IMAGE".to_string(),
        "TEMPLATE".to_string(),
    ];

    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        table.push_str(line.trim_end());
        table.push('\n');
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_registry() {
        let records = vec![
            ContainerRecord {
                name: "api".to_string(),
                template_dir: Some(PathBuf::from("/templates/api")),
                id: "abc".to_string(),
                image: "myapp:v1".to_string(),
                state: "running".to_string(),
                ..Default::default()
            },
            ContainerRecord {
                name: "db".to_string(),
                template_dir: Some(PathBuf::from("/templates/db")),
                ..Default::default()
            },
            ContainerRecord {
                name: "redis".to_string(),
                id: "def".to_string(),
                image: "redis:7".to_string(),
                state: "exited".to_string(),
                ..Default::default()
            },
        ];

        let table = format_registry(&records);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].contains("running") && lines[1].contains("/templates/api"));
        assert!(lines[2].contains("not installed"));
        assert!(lines[3].starts_with("redis") && lines[3].ends_with("-"));
    }

    fn unreachable_runtime_config(template_dir: &std::path::Path, locks: &std::path::Path) -> Config {
        Config {
            template_dir: template_dir.to_path_buf(),
            // rejected before any connection is attempted
            docker_host: "ssh://deploy@unreachable".to_string(),
            lock_dir: Some(locks.to_path_buf()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_falls_back_to_declared_projects() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(templates.join("api/templates")).unwrap();
        fs::write(templates.join("api/values.yml"), "tag: v1\n").unwrap();
        fs::write(templates.join("api/templates/compose.yml"), "image: app:{{tag}}\n").unwrap();

        let config = unreachable_runtime_config(&templates, &dir.path().join("locks"));

        list_projects(false, &config).await.unwrap();
        list_projects(true, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_actions_require_the_runtime() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();

        let config = unreachable_runtime_config(&templates, &dir.path().join("locks"));

        assert!(install("api".to_string(), &config).await.is_err());
        assert!(lifecycle(Action::Stop, "api".to_string(), &config)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_render_file_command_writes_into_output_dir() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("api");
        fs::create_dir_all(project.join("templates")).unwrap();
        fs::write(project.join("values.yml"), "tag: v3\n").unwrap();
        fs::write(project.join("templates/compose.yml"), "image: app:{{tag}}\n").unwrap();

        let out = dir.path().join("out");
        render_file(
            project.join("templates/compose.yml"),
            Some(out.clone()),
            &Config::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            fs::read_to_string(out.join("compose.yml")).unwrap(),
            "image: app:v3\n"
        );
    }
}
