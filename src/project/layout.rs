// ABOUTME: Filesystem naming conventions shared by the scanner, renderer, and installer
// ABOUTME: Encodes the project layout as named constants plus a conformance check

use std::path::{Path, PathBuf};

use super::error::LayoutError;

/// Manifest file names that mark a directory as holding a compose project.
pub const COMPOSE_FILE_NAMES: [&str; 2] = ["docker-compose.yml", "compose.yml"];

/// Per-project values consumed by every manifest render.
pub const VALUES_FILE_NAME: &str = "values.yml";

/// Shared fragments resolved by the `include` template helper.
pub const INCLUDES_FILE_NAME: &str = "includes.template";

/// Suffix selecting which files are rendered instead of copied.
pub const MANIFEST_SUFFIX: &str = ".yml";

/// Returns true when `file_name` is one of the canonical compose manifest names.
pub fn is_compose_file(file_name: &str) -> bool {
    COMPOSE_FILE_NAMES.contains(&file_name)
}

/// Returns true when a file should go through the template engine.
///
/// Every `*.yml` file except the values file is a manifest; the renderer never
/// looks inside the YAML beyond treating it as template text.
pub fn is_manifest(file_name: &str) -> bool {
    file_name.ends_with(MANIFEST_SUFFIX) && file_name != VALUES_FILE_NAME
}

/// Locate the compose manifest directly inside `dir`, if any.
pub fn compose_file_in(dir: &Path) -> Option<PathBuf> {
    COMPOSE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Directory whose `values.yml` and `includes.template` serve the given manifest.
///
/// Manifests live one level below that directory, so this is the parent of the
/// manifest's own directory.
pub fn values_root(manifest_path: &Path) -> Option<&Path> {
    manifest_path.parent().and_then(Path::parent)
}

/// Check that `project_root` follows the expected layout.
///
/// A conforming project has a values file at its root (or, for projects that sit
/// directly under a shared root, in its parent) and a compose manifest either at
/// its root or in one of its immediate subdirectories.
pub fn validate_layout(project_root: &Path) -> Result<(), LayoutError> {
    if !project_root.is_dir() {
        return Err(LayoutError::NotADirectory(project_root.to_path_buf()));
    }

    let manifest_dir = find_compose_dir(project_root)
        .ok_or_else(|| LayoutError::MissingComposeFile(project_root.to_path_buf()))?;

    let values_dir = manifest_dir
        .parent()
        .ok_or_else(|| LayoutError::MissingValuesFile(project_root.join(VALUES_FILE_NAME)))?;

    let values_file = values_dir.join(VALUES_FILE_NAME);
    if !values_file.is_file() {
        return Err(LayoutError::MissingValuesFile(values_file));
    }

    Ok(())
}

/// Find the directory holding the compose manifest: `dir` itself, or the first
/// immediate subdirectory (by name) that holds one.
pub fn find_compose_dir(dir: &Path) -> Option<PathBuf> {
    if compose_file_in(dir).is_some() {
        return Some(dir.to_path_buf());
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    subdirs
        .into_iter()
        .find(|subdir| compose_file_in(subdir).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_selection() {
        assert!(is_manifest("compose.yml"));
        assert!(is_manifest("service.yml"));
        assert!(!is_manifest("values.yml"));
        assert!(!is_manifest("compose.yaml"));
        assert!(!is_manifest("includes.template"));
        assert!(!is_manifest("nginx.conf"));
    }

    #[test]
    fn test_compose_file_names() {
        assert!(is_compose_file("docker-compose.yml"));
        assert!(is_compose_file("compose.yml"));
        assert!(!is_compose_file("docker-compose.yaml"));
        assert!(!is_compose_file("other.yml"));
    }

    #[test]
    fn test_values_root_is_grandparent() {
        let manifest = Path::new("/srv/projects/api/templates/compose.yml");
        assert_eq!(values_root(manifest), Some(Path::new("/srv/projects/api")));
    }

    #[test]
    fn test_validate_layout_nested() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("api");
        fs::create_dir_all(project.join("templates")).unwrap();
        fs::write(project.join("values.yml"), "tag: v1\n").unwrap();
        fs::write(project.join("templates/compose.yml"), "services: {}\n").unwrap();

        assert!(validate_layout(&project).is_ok());
        assert_eq!(find_compose_dir(&project), Some(project.join("templates")));
    }

    #[test]
    fn test_validate_layout_reports_missing_pieces() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("api");
        fs::create_dir_all(project.join("templates")).unwrap();

        assert!(matches!(
            validate_layout(&project),
            Err(LayoutError::MissingComposeFile(_))
        ));

        fs::write(project.join("templates/compose.yml"), "services: {}\n").unwrap();
        assert!(matches!(
            validate_layout(&project),
            Err(LayoutError::MissingValuesFile(_))
        ));
    }
}
