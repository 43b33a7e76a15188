// ABOUTME: Directory scanner that discovers compose projects under a root directory
// ABOUTME: Maps project names to their absolute template directories, failing fast on IO errors

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::error::{Result, ScanError};
use super::layout::{is_compose_file, validate_layout, VALUES_FILE_NAME};

/// A deployable project discovered on disk.
///
/// The template directory is fixed at discovery time; there is no way to change it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateProject {
    name: String,
    template_dir: PathBuf,
}

impl TemplateProject {
    pub fn new(name: impl Into<String>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            template_dir: template_dir.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }
}

pub type ProjectMap = BTreeMap<String, TemplateProject>;

/// Walk `root` and collect every compose project below it.
///
/// A directory holding `docker-compose.yml` or `compose.yml` marks a project.
/// Compose files sitting directly in `root` are ignored. Every project must pass
/// [`validate_layout`], so anything listed here can be rendered. Any walk, path
/// resolution or layout error aborts the scan; no partial map is returned.
pub fn scan_projects(root: &Path) -> Result<ProjectMap> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::RootNotADirectory(root.to_path_buf()));
    }

    info!("Scanning for compose projects in {}", root.display());

    let mut projects = ProjectMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ScanError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        // depth 1 files live directly in the scan root
        if !entry.file_type().is_file() || entry.depth() <= 1 {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !is_compose_file(&file_name) {
            continue;
        }

        let compose_dir = match entry.path().parent() {
            Some(dir) => dir,
            None => continue,
        };

        let project_root = resolve_project_root(compose_dir, root);
        let template_dir =
            std::path::absolute(project_root).map_err(|source| ScanError::AbsolutePath {
                path: project_root.to_path_buf(),
                source,
            })?;

        let name = project_root
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ScanError::UnnamedProject(project_root.to_path_buf()))?
            .to_string();

        validate_layout(project_root).map_err(|source| ScanError::Layout {
            name: name.clone(),
            source,
        })?;

        debug!(
            "Found project '{}' at {} ({})",
            name,
            template_dir.display(),
            file_name
        );

        if let Some(previous) = projects.insert(
            name.clone(),
            TemplateProject::new(name.clone(), template_dir),
        ) {
            warn!(
                "Project name '{}' is declared more than once; replacing {}",
                name,
                previous.template_dir().display()
            );
        }
    }

    info!("Discovered {} compose projects", projects.len());

    Ok(projects)
}

/// Decide which directory is the project for a compose file found in `compose_dir`.
///
/// Values always come from the parent of the manifest's directory. When that
/// parent is below the scan root and holds the values file, the manifest sits in
/// a subdirectory of the project and the parent is the project. Otherwise the
/// compose file's own directory is the project.
fn resolve_project_root<'a>(compose_dir: &'a Path, scan_root: &Path) -> &'a Path {
    match compose_dir.parent() {
        Some(parent)
            if parent != scan_root
                && parent.starts_with(scan_root)
                && parent.join(VALUES_FILE_NAME).is_file() =>
        {
            parent
        }
        _ => compose_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::LayoutError;
    use crate::template::TemplateRenderer;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_scan_flat_projects_under_shared_root() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("values.yml"), "tag: v1\n");
        touch(&dir.path().join("web/docker-compose.yml"), "services: {}\n");
        touch(&dir.path().join("db/compose.yml"), "services: {}\n");

        let projects = scan_projects(dir.path()).unwrap();

        assert_eq!(projects.len(), 2);
        let web = &projects["web"];
        assert_eq!(web.name(), "web");
        assert!(web.template_dir().is_absolute());
        assert!(web.template_dir().ends_with("web"));
        assert!(projects.contains_key("db"));
    }

    #[test]
    fn test_scan_nested_project_uses_values_root() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("projects/api/values.yml"), "tag: v1\n");
        touch(
            &dir.path().join("projects/api/templates/compose.yml"),
            "services: {}\n",
        );

        let projects = scan_projects(dir.path()).unwrap();

        assert_eq!(projects.len(), 1);
        let api = &projects["api"];
        assert!(api.template_dir().ends_with("projects/api"));
    }

    #[test]
    fn test_scan_ignores_compose_file_in_root() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("compose.yml"), "services: {}\n");
        touch(&dir.path().join("notes/readme.txt"), "hello\n");

        let projects = scan_projects(dir.path()).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_scan_ignores_other_yaml_names() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("svc/compose.yaml"), "services: {}\n");
        touch(&dir.path().join("svc/other.yml"), "services: {}\n");

        let projects = scan_projects(dir.path()).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_scan_is_repeatable() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("values.yml"), "");
        touch(&dir.path().join("a/compose.yml"), "");
        touch(&dir.path().join("b/values.yml"), "");
        touch(&dir.path().join("b/c/docker-compose.yml"), "");

        let first = scan_projects(dir.path()).unwrap();
        let second = scan_projects(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_values_beside_compose_file_is_rejected() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("web/values.yml"), "tag: v1\n");
        touch(&dir.path().join("web/compose.yml"), "image: web:{{tag}}\n");

        match scan_projects(dir.path()) {
            Err(ScanError::Layout { name, source }) => {
                assert_eq!(name, "web");
                assert!(matches!(source, LayoutError::MissingValuesFile(ref path)
                    if path == &dir.path().join(VALUES_FILE_NAME)));
            }
            other => panic!("unexpected scan result: {:?}", other),
        }
    }

    #[test]
    fn test_every_scanned_project_renders() {
        let dir = tempdir().unwrap();
        // shared values for projects directly under the root
        touch(&dir.path().join("values.yml"), "tag: v1\n");
        touch(&dir.path().join("web/compose.yml"), "image: web:{{tag}}\n");
        // project carrying its own values with manifests one level down
        touch(&dir.path().join("api/values.yml"), "tag: v2\n");
        touch(
            &dir.path().join("api/templates/compose.yml"),
            "image: api:{{tag}}\n",
        );

        let projects = scan_projects(dir.path()).unwrap();
        assert_eq!(projects.len(), 2);

        let renderer = TemplateRenderer::new();
        for project in projects.values() {
            let out = tempdir().unwrap();
            renderer
                .render_dir(project.template_dir(), out.path())
                .unwrap_or_else(|e| panic!("{} failed to render: {}", project.name(), e));
        }
    }

    #[test]
    fn test_scan_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            scan_projects(&missing),
            Err(ScanError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_scan_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        touch(&file, "x");

        assert!(matches!(
            scan_projects(&file),
            Err(ScanError::RootNotADirectory(_))
        ));
    }
}
